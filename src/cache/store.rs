//! Query store.
//!
//! Holds the collection view and per-post comment lists for one session.
//! The store is an explicit value handed to whoever needs it; there is no
//! process-wide instance.

use std::sync::RwLock;

use lru::LruCache;
use metrics::counter;
use tracing::debug;

use crate::domain::posts::{Comment, Post, PostId};

use super::config::CacheConfig;
use super::events::{SyncEvent, SyncLog};
use super::keys::QueryKey;
use super::lock::{rw_read, rw_write};
use super::sync::CacheSync;

const SOURCE: &str = "cache::store";

pub(crate) const METRIC_CACHE_HIT: &str = "postboard_cache_hit_total";
pub(crate) const METRIC_CACHE_MISS: &str = "postboard_cache_miss_total";
pub(crate) const METRIC_CACHE_EVICT: &str = "postboard_cache_evict_total";
pub(crate) const METRIC_CACHE_SYNC: &str = "postboard_cache_sync_total";

/// The cached collection view. `fetched` records whether the view was ever
/// seeded from the server; a view built only from folded mutations is present
/// but not fetched.
#[derive(Default)]
struct PostsSlot {
    view: Option<Vec<Post>>,
    fetched: bool,
}

pub struct QueryStore {
    posts: RwLock<PostsSlot>,
    comments: RwLock<LruCache<PostId, Vec<Comment>>>,
    log: SyncLog,
}

impl QueryStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            posts: RwLock::new(PostsSlot::default()),
            comments: RwLock::new(LruCache::new(config.comment_limit_non_zero())),
            log: SyncLog::new(config.sync_log_limit_non_zero()),
        }
    }

    // ========================================================================
    // Collection view
    // ========================================================================

    /// Current cached collection view, or `None` if nothing was ever
    /// published.
    pub fn posts(&self) -> Option<Vec<Post>> {
        let cached = rw_read(&self.posts, SOURCE, "posts").view.clone();
        record_lookup(QueryKey::Posts, cached.is_some());
        cached
    }

    /// Cached collection view, but only once it has been seeded by a fetch.
    pub fn fetched_posts(&self) -> Option<Vec<Post>> {
        let slot = rw_read(&self.posts, SOURCE, "fetched_posts");
        let cached = if slot.fetched { slot.view.clone() } else { None };
        drop(slot);
        record_lookup(QueryKey::Posts, cached.is_some());
        cached
    }

    pub fn is_fetched(&self) -> bool {
        rw_read(&self.posts, SOURCE, "is_fetched").fetched
    }

    /// Seed the view from a fetch, replacing anything published before.
    pub fn set_posts(&self, posts: Vec<Post>) {
        let mut slot = rw_write(&self.posts, SOURCE, "set_posts");
        slot.view = Some(posts);
        slot.fetched = true;
    }

    pub fn invalidate_posts(&self) {
        *rw_write(&self.posts, SOURCE, "invalidate_posts") = PostsSlot::default();
    }

    /// Read the current view, compute the next one with `f`, and publish it,
    /// all under one write lock. An uninitialised view is handed to `f` as an
    /// empty sequence. `f` returns the next view plus a value passed back to
    /// the caller.
    pub fn publish_posts<F, R>(&self, f: F) -> R
    where
        F: FnOnce(Vec<Post>) -> (Vec<Post>, R),
    {
        let mut slot = rw_write(&self.posts, SOURCE, "publish_posts");
        let (next, out) = f(slot.view.take().unwrap_or_default());
        slot.view = Some(next);
        out
    }

    /// Fold a completed mutation into the collection view and log it.
    pub fn apply(&self, sync: CacheSync) -> SyncEvent {
        let kind = sync.kind();
        let post_id = sync.target_id();

        self.publish_posts(|current| {
            let hit = sync.hits(&current);
            let len_before = current.len();
            if !hit {
                debug!(
                    mutation = kind.as_str(),
                    post_id, "Cache sync target not cached; leaving view unchanged"
                );
            }

            let next = sync.apply(current);
            counter!(METRIC_CACHE_SYNC, "mutation" => kind.as_str()).increment(1);
            // Recorded before the lock is released so epochs follow application order.
            let event = self.log.record(kind, post_id, hit, len_before, next.len());
            (next, event)
        })
    }

    // ========================================================================
    // Comments
    // ========================================================================

    pub fn comments(&self, post_id: PostId) -> Option<Vec<Comment>> {
        let cached = rw_write(&self.comments, SOURCE, "comments")
            .get(&post_id)
            .cloned();
        record_lookup(QueryKey::Comments(post_id), cached.is_some());
        cached
    }

    pub fn set_comments(&self, post_id: PostId, comments: Vec<Comment>) {
        let evicted = rw_write(&self.comments, SOURCE, "set_comments").push(post_id, comments);
        if let Some((evicted_id, _)) = evicted {
            if evicted_id != post_id {
                counter!(METRIC_CACHE_EVICT).increment(1);
                debug!(post_id = evicted_id, "Evicted cached comments");
            }
        }
    }

    pub fn invalidate_comments(&self, post_id: PostId) {
        rw_write(&self.comments, SOURCE, "invalidate_comments").pop(&post_id);
    }

    // ========================================================================
    // Bulk operations
    // ========================================================================

    pub fn contains(&self, key: QueryKey) -> bool {
        match key {
            QueryKey::Posts => rw_read(&self.posts, SOURCE, "contains.posts")
                .view
                .is_some(),
            QueryKey::Comments(id) => {
                rw_read(&self.comments, SOURCE, "contains.comments").contains(&id)
            }
        }
    }

    pub fn sync_log(&self) -> &SyncLog {
        &self.log
    }

    /// Clear all cached data.
    pub fn clear(&self) {
        self.invalidate_posts();
        rw_write(&self.comments, SOURCE, "clear.comments").clear();
        self.log.clear();
    }
}

fn record_lookup(key: QueryKey, hit: bool) {
    if hit {
        counter!(METRIC_CACHE_HIT, "query" => key.resource()).increment(1);
    } else {
        counter!(METRIC_CACHE_MISS, "query" => key.resource()).increment(1);
    }
}
