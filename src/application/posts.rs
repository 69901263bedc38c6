//! Posts service: loads queries through the cache and runs mutations through
//! their lifecycle, folding each success into the collection view.

use std::future::Future;
use std::sync::Arc;

use metrics::counter;
use tracing::{info, instrument, warn};

use crate::application::METRIC_MUTATION_FAILED;
use crate::application::error::AppError;
use crate::application::mutation::{Mutation, MutationState};
use crate::application::transport::{PostsApi, TransportError};
use crate::cache::{CacheSync, QueryStore, SyncEvent, SyncKind};
use crate::domain::posts::{
    Comment, NewPost, Post, PostId, PostPatch, UserId, validate_content, validate_new_post,
    validate_patch,
};

/// Result of a mutation that completed and was folded into the cache.
#[derive(Debug, Clone)]
pub struct Applied<T> {
    /// The server's success value.
    pub value: T,
    pub event: SyncEvent,
    pub state: MutationState,
}

/// Input for a full replacement of a post.
#[derive(Debug, Clone)]
pub struct PostUpdate {
    pub id: PostId,
    pub user_id: UserId,
    pub title: String,
    pub body: String,
}

impl From<PostUpdate> for Post {
    fn from(update: PostUpdate) -> Self {
        Post {
            id: update.id,
            user_id: update.user_id,
            title: update.title,
            body: update.body,
        }
    }
}

pub struct PostsService<A: PostsApi + ?Sized> {
    api: Arc<A>,
    store: Arc<QueryStore>,
}

impl<A: PostsApi + ?Sized> Clone for PostsService<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            store: Arc::clone(&self.store),
        }
    }
}

impl<A: PostsApi + ?Sized> PostsService<A> {
    pub fn new(api: Arc<A>, store: Arc<QueryStore>) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &QueryStore {
        &self.store
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Cached collection view, fetching it until it has been seeded once.
    /// Mutations folded into a never-fetched view do not count as a fetch.
    pub async fn load_posts(&self) -> Result<Vec<Post>, AppError> {
        if let Some(posts) = self.store.fetched_posts() {
            return Ok(posts);
        }
        self.refresh_posts().await
    }

    /// Fetch the collection view and replace whatever is cached.
    #[instrument(skip(self), err)]
    pub async fn refresh_posts(&self) -> Result<Vec<Post>, AppError> {
        let posts = self.api.get_posts().await?;
        self.store.set_posts(posts.clone());
        Ok(posts)
    }

    /// Comments of one post, fetched lazily and cached per post.
    pub async fn load_comments(&self, post_id: PostId) -> Result<Vec<Comment>, AppError> {
        if let Some(comments) = self.store.comments(post_id) {
            return Ok(comments);
        }
        let comments = self.api.get_comments(post_id).await?;
        self.store.set_comments(post_id, comments.clone());
        Ok(comments)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    pub async fn create(&self, post: NewPost) -> Result<Applied<Post>, AppError> {
        validate_new_post(&post)?;
        let call = self.api.create_post(post);
        self.run(SyncKind::Create, None, call, |created: &Post| {
            CacheSync::Created(created.clone())
        })
        .await
    }

    pub async fn update(&self, update: PostUpdate) -> Result<Applied<Post>, AppError> {
        validate_content(&update.title, &update.body)?;
        let id = update.id;
        let call = self.api.update_post(update.into());
        self.run(SyncKind::Update, Some(id), call, |updated: &Post| {
            CacheSync::Updated(updated.clone())
        })
        .await
    }

    /// Send `patch` and merge the fields the server echoes back onto the
    /// cached entry with `id`.
    pub async fn patch(&self, id: PostId, patch: PostPatch) -> Result<Applied<PostPatch>, AppError> {
        validate_patch(&patch)?;
        let call = self.api.patch_post(id, patch);
        self.run(SyncKind::Patch, Some(id), call, move |echoed: &PostPatch| {
            CacheSync::Patched {
                id,
                patch: echoed.clone(),
            }
        })
        .await
    }

    /// Delete a post; its cached comments go with it.
    pub async fn delete(&self, id: PostId) -> Result<Applied<()>, AppError> {
        let call = self.api.delete_post(id);
        let applied = self
            .run(SyncKind::Delete, Some(id), call, move |_: &()| {
                CacheSync::Deleted(id)
            })
            .await?;
        self.store.invalidate_comments(id);
        Ok(applied)
    }

    async fn run<T, Fut, S>(
        &self,
        kind: SyncKind,
        post_id: Option<PostId>,
        call: Fut,
        to_sync: S,
    ) -> Result<Applied<T>, AppError>
    where
        Fut: Future<Output = Result<T, TransportError>>,
        S: FnOnce(&T) -> CacheSync,
    {
        let mut mutation = Mutation::new(kind, post_id);
        mutation.start()?;

        match call.await {
            Ok(value) => {
                mutation.succeed()?;
                let event = self.store.apply(to_sync(&value));
                mutation.mark_synced()?;
                info!(
                    mutation = kind.as_str(),
                    post_id = event.post_id,
                    epoch = event.epoch,
                    state = mutation.state().as_str(),
                    "Mutation completed"
                );
                Ok(Applied {
                    value,
                    event,
                    state: mutation.state(),
                })
            }
            Err(err) => {
                mutation.fail()?;
                counter!(METRIC_MUTATION_FAILED, "mutation" => kind.as_str()).increment(1);
                warn!(
                    mutation = kind.as_str(),
                    post_id,
                    state = mutation.state().as_str(),
                    error = %err,
                    "Mutation failed; cache left unchanged"
                );
                Err(err.into())
            }
        }
    }
}
