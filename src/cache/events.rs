//! Sync event log.
//!
//! Records every cache sync the store applies. Epochs are assigned while the
//! store's write lock is held, so epoch order is the order in which mutations
//! completed and were folded into the collection view.

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::domain::posts::PostId;

use super::lock::mutex_lock;
use super::sync::SyncKind;

const SOURCE: &str = "cache::events";

/// Monotonic epoch for ordering applied syncs.
pub type Epoch = u64;

/// One applied cache sync.
#[derive(Debug, Clone)]
pub struct SyncEvent {
    /// Unique identifier of this application.
    pub id: Uuid,
    pub epoch: Epoch,
    pub kind: SyncKind,
    pub post_id: PostId,
    /// Whether the target id was present in the cache. Always true for creates.
    pub hit: bool,
    pub len_before: usize,
    pub len_after: usize,
    pub timestamp: OffsetDateTime,
}

/// Bounded in-memory log of applied syncs. The oldest entry is dropped once
/// the limit is reached.
pub struct SyncLog {
    entries: Mutex<VecDeque<SyncEvent>>,
    epoch_counter: AtomicU64,
    limit: NonZeroUsize,
}

impl SyncLog {
    pub fn new(limit: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            epoch_counter: AtomicU64::new(0),
            limit,
        }
    }

    /// Get the next epoch number.
    pub fn next_epoch(&self) -> Epoch {
        self.epoch_counter.fetch_add(1, Ordering::SeqCst)
    }

    pub(crate) fn record(
        &self,
        kind: SyncKind,
        post_id: PostId,
        hit: bool,
        len_before: usize,
        len_after: usize,
    ) -> SyncEvent {
        let event = SyncEvent {
            id: Uuid::new_v4(),
            epoch: self.next_epoch(),
            kind,
            post_id,
            hit,
            len_before,
            len_after,
            timestamp: OffsetDateTime::now_utc(),
        };

        info!(
            sync_id = %event.id,
            epoch = event.epoch,
            mutation = kind.as_str(),
            post_id,
            hit,
            len_before,
            len_after,
            "Cache sync applied"
        );

        let mut entries = mutex_lock(&self.entries, SOURCE, "record");
        if entries.len() >= self.limit.get() {
            entries.pop_front();
        }
        entries.push_back(event.clone());
        event
    }

    /// Snapshot of retained events, oldest first.
    pub fn events(&self) -> Vec<SyncEvent> {
        mutex_lock(&self.entries, SOURCE, "events")
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        mutex_lock(&self.entries, SOURCE, "clear").clear();
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    fn log(limit: usize) -> SyncLog {
        SyncLog::new(NonZeroUsize::new(limit).expect("non-zero limit"))
    }

    #[test]
    fn epoch_monotonicity() {
        let log = log(4);
        let e1 = log.record(SyncKind::Create, 1, true, 0, 1).epoch;
        let e2 = log.record(SyncKind::Delete, 1, true, 1, 0).epoch;
        assert!(e1 < e2);
    }

    #[test]
    fn records_in_application_order() {
        let log = log(8);
        log.record(SyncKind::Patch, 2, true, 3, 3);
        log.record(SyncKind::Delete, 1, true, 3, 2);

        let events = log.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, SyncKind::Patch);
        assert_eq!(events[1].post_id, 1);
        assert!(!events[0].id.is_nil());
    }

    #[test]
    fn drops_oldest_past_limit() {
        let log = log(2);
        log.record(SyncKind::Create, 1, true, 0, 1);
        log.record(SyncKind::Create, 2, true, 1, 2);
        log.record(SyncKind::Create, 3, true, 2, 3);

        let ids: Vec<_> = log.events().iter().map(|e| e.post_id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn clear_log() {
        let log = log(2);
        log.record(SyncKind::Update, 1, false, 0, 0);
        assert!(!log.is_empty());
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn sync_log_recovers_from_poisoned_lock() {
        let log = log(2);

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = log.entries.lock().expect("entries lock should be acquired");
            panic!("poison entries lock");
        }));

        log.record(SyncKind::Delete, 1, true, 1, 0);
        assert_eq!(log.len(), 1);
    }
}
