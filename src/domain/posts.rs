//! Post entities and the field-level rules applied to them.

pub use postboard_api_types::{Comment, NewPost, Post, PostId, PostPatch, UserId};

use super::error::DomainError;

/// Suffix the "patch" demo action appends to a post title.
pub const PATCHED_TITLE_SUFFIX: &str = " [Patched]";

/// Shallow-merge `patch` onto `post`. Fields absent from the patch keep their
/// current value; the id is never touched.
pub fn merge_patch(post: &Post, patch: &PostPatch) -> Post {
    Post {
        id: post.id,
        user_id: patch.user_id.unwrap_or(post.user_id),
        title: patch.title.clone().unwrap_or_else(|| post.title.clone()),
        body: patch.body.clone().unwrap_or_else(|| post.body.clone()),
    }
}

/// Patch that marks `post` as patched by appending [`PATCHED_TITLE_SUFFIX`].
pub fn patched_title(post: &Post) -> PostPatch {
    PostPatch::title(format!("{}{PATCHED_TITLE_SUFFIX}", post.title))
}

/// Title and body are both required inputs for create and full update.
pub fn validate_content(title: &str, body: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::validation("title must not be empty"));
    }
    if body.trim().is_empty() {
        return Err(DomainError::validation("body must not be empty"));
    }
    Ok(())
}

pub fn validate_new_post(post: &NewPost) -> Result<(), DomainError> {
    validate_content(&post.title, &post.body)
}

pub fn validate_patch(patch: &PostPatch) -> Result<(), DomainError> {
    if patch.is_empty() {
        return Err(DomainError::validation("patch must set at least one field"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: PostId, title: &str) -> Post {
        Post {
            id,
            user_id: 1,
            title: title.to_string(),
            body: format!("body {id}"),
        }
    }

    #[test]
    fn merge_keeps_fields_missing_from_patch() {
        let original = post(1, "A");
        let merged = merge_patch(&original, &PostPatch::title("A*"));
        assert_eq!(merged.title, "A*");
        assert_eq!(merged.body, "body 1");
        assert_eq!(merged.user_id, 1);
        assert_eq!(merged.id, 1);
    }

    #[test]
    fn merge_applies_every_present_field() {
        let patch = PostPatch {
            user_id: Some(9),
            title: Some("t".into()),
            body: Some("b".into()),
        };
        let merged = merge_patch(&post(3, "x"), &patch);
        assert_eq!(
            merged,
            Post {
                id: 3,
                user_id: 9,
                title: "t".into(),
                body: "b".into(),
            }
        );
    }

    #[test]
    fn patched_title_appends_suffix() {
        let patch = patched_title(&post(1, "Hello"));
        assert_eq!(patch.title.as_deref(), Some("Hello [Patched]"));
        assert!(patch.body.is_none());
    }

    #[test]
    fn blank_content_is_rejected() {
        assert!(validate_content("  ", "body").is_err());
        assert!(validate_content("title", "").is_err());
        assert!(validate_content("title", "body").is_ok());
    }

    #[test]
    fn empty_patch_is_rejected() {
        let err = validate_patch(&PostPatch::default()).expect_err("empty patch");
        assert!(matches!(err, DomainError::Validation { .. }));
    }
}
