use async_trait::async_trait;
use thiserror::Error;

use crate::domain::posts::{Comment, NewPost, Post, PostId, PostPatch};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("request timed out")]
    Timeout,
    #[error("server responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn from_request(err: impl std::fmt::Display) -> Self {
        Self::Request(err.to_string())
    }

    pub fn from_decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }

    /// Transient failures a user can reasonably retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(_) | Self::Timeout => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Decode(_) => false,
        }
    }
}

/// The posts API as seen by the application layer. Each call either resolves
/// to the server's success value or fails with a [`TransportError`].
#[async_trait]
pub trait PostsApi: Send + Sync {
    async fn get_posts(&self) -> Result<Vec<Post>, TransportError>;

    async fn create_post(&self, post: NewPost) -> Result<Post, TransportError>;

    async fn update_post(&self, post: Post) -> Result<Post, TransportError>;

    async fn patch_post(&self, id: PostId, patch: PostPatch) -> Result<PostPatch, TransportError>;

    async fn delete_post(&self, id: PostId) -> Result<(), TransportError>;

    async fn get_comments(&self, post_id: PostId) -> Result<Vec<Comment>, TransportError>;
}
