//! Query key definitions.

use std::fmt;

use crate::domain::posts::PostId;

/// Identifies one cached query result.
///
/// Mirrors the tuple keys of the upstream query cache: `["posts"]` for the
/// collection view and `["comments", post_id]` for a post's comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The "list all posts" collection view.
    Posts,
    /// Comments of one post, fetched lazily.
    Comments(PostId),
}

impl QueryKey {
    pub fn resource(&self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Comments(_) => "comments",
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Posts => write!(f, "[\"posts\"]"),
            Self::Comments(id) => write!(f, "[\"comments\", {id}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_render_as_tuples() {
        assert_eq!(QueryKey::Posts.to_string(), r#"["posts"]"#);
        assert_eq!(QueryKey::Comments(3).to_string(), r#"["comments", 3]"#);
    }

    #[test]
    fn comment_keys_differ_by_post() {
        assert_ne!(QueryKey::Comments(1), QueryKey::Comments(2));
        assert_eq!(QueryKey::Comments(1).resource(), "comments");
    }
}
