//! Wire types for the JSONPlaceholder posts API.
//!
//! Field names follow the upstream JSON (`userId`, `postId`), so every type
//! here serialises with `camelCase`.

use serde::{Deserialize, Serialize};

pub type PostId = i64;
pub type UserId = i64;
pub type CommentId = i64;

/// A blog post as returned by `/posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub title: String,
    pub body: String,
}

/// A comment attached to a post, as returned by `/posts/{id}/comments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub body: String,
}

/// Fields supplied by the user when creating a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub body: String,
}

/// Body of `POST /posts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCreateRequest {
    pub title: String,
    pub body: String,
    pub user_id: UserId,
}

impl PostCreateRequest {
    pub fn new(post: NewPost, user_id: UserId) -> Self {
        Self {
            title: post.title,
            body: post.body,
            user_id,
        }
    }
}

/// A partial set of post fields.
///
/// Used both as the body of `PATCH /posts/{id}` and to decode its response;
/// fields that are `None` are omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl PostPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.title.is_none() && self.body.is_none()
    }
}
