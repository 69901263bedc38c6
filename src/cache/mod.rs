//! Postboard query cache.
//!
//! Keeps the last known result of each query in memory and folds successful
//! mutations into it without refetching:
//!
//! - [`QueryStore`] holds the collection view (`["posts"]`) and per-post
//!   comment lists (`["comments", id]`).
//! - [`sync`] contains the pure transforms applied on create, update, patch
//!   and delete.
//! - [`SyncLog`] records every applied sync in completion order.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! comment_limit = 64
//! sync_log_limit = 256
//! ```

mod config;
mod events;
mod keys;
mod lock;
mod store;
pub mod sync;

pub use config::CacheConfig;
pub use events::{Epoch, SyncEvent, SyncLog};
pub use keys::QueryKey;
pub use store::QueryStore;
pub use sync::{CacheSync, SyncKind, apply_create, apply_delete, apply_patch, apply_update};

pub(crate) use store::{METRIC_CACHE_EVICT, METRIC_CACHE_HIT, METRIC_CACHE_MISS, METRIC_CACHE_SYNC};
