//! Optimistic cache sync.
//!
//! Pure transforms that fold the result of a completed mutation into the
//! cached collection view, so a successful create/update/patch/delete never
//! needs a refetch. Every transform preserves the relative order of the
//! entries it does not touch and never fails.

use crate::domain::posts::{Post, PostId, PostPatch, merge_patch};

/// Prepend `new_post`. No deduplication by id is performed.
pub fn apply_create(mut cache: Vec<Post>, new_post: Post) -> Vec<Post> {
    cache.insert(0, new_post);
    cache
}

/// Replace every entry whose id matches `updated.id`. A miss leaves the cache
/// unchanged; nothing is inserted.
pub fn apply_update(mut cache: Vec<Post>, updated: Post) -> Vec<Post> {
    for slot in cache.iter_mut().filter(|post| post.id == updated.id) {
        *slot = updated.clone();
    }
    cache
}

/// Shallow-merge `patch` onto every entry with `id`.
pub fn apply_patch(mut cache: Vec<Post>, patch: &PostPatch, id: PostId) -> Vec<Post> {
    for slot in cache.iter_mut().filter(|post| post.id == id) {
        *slot = merge_patch(slot, patch);
    }
    cache
}

/// Drop the entry with `id`. Removing an absent id is a no-op.
pub fn apply_delete(mut cache: Vec<Post>, id: PostId) -> Vec<Post> {
    cache.retain(|post| post.id != id);
    cache
}

/// The outcome of one successful mutation, ready to be folded into the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheSync {
    Created(Post),
    Updated(Post),
    Patched { id: PostId, patch: PostPatch },
    Deleted(PostId),
}

impl CacheSync {
    pub fn apply(self, cache: Vec<Post>) -> Vec<Post> {
        match self {
            Self::Created(post) => apply_create(cache, post),
            Self::Updated(post) => apply_update(cache, post),
            Self::Patched { id, patch } => apply_patch(cache, &patch, id),
            Self::Deleted(id) => apply_delete(cache, id),
        }
    }

    pub fn target_id(&self) -> PostId {
        match self {
            Self::Created(post) | Self::Updated(post) => post.id,
            Self::Patched { id, .. } | Self::Deleted(id) => *id,
        }
    }

    pub fn kind(&self) -> SyncKind {
        match self {
            Self::Created(_) => SyncKind::Create,
            Self::Updated(_) => SyncKind::Update,
            Self::Patched { .. } => SyncKind::Patch,
            Self::Deleted(_) => SyncKind::Delete,
        }
    }

    /// Whether this sync would find its target in `cache`. Creates always do.
    pub fn hits(&self, cache: &[Post]) -> bool {
        match self {
            Self::Created(_) => true,
            _ => {
                let id = self.target_id();
                cache.iter().any(|post| post.id == id)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncKind {
    Create,
    Update,
    Patch,
    Delete,
}

impl SyncKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Patch => "patch",
            Self::Delete => "delete",
        }
    }
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

    fn ids(cache: &[Post]) -> Vec<PostId> {
        cache.iter().map(|p| p.id).collect()
    }

    fn sample() -> Vec<Post> {
        vec![post(1, "A"), post(2, "B"), post(3, "C")]
    }

    #[test]
    fn create_prepends_and_keeps_order() {
        let before = sample();
        let after = apply_create(before.clone(), post(101, "New"));
        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(after[0].id, 101);
        assert_eq!(&after[1..], before.as_slice());
    }

    #[test]
    fn create_does_not_deduplicate() {
        let after = apply_create(sample(), post(2, "Echo"));
        assert_eq!(ids(&after), vec![2, 1, 2, 3]);
    }

    #[test]
    fn create_on_empty_cache() {
        let after = apply_create(Vec::new(), post(1, "A"));
        assert_eq!(ids(&after), vec![1]);
    }

    #[test]
    fn update_replaces_in_place() {
        let updated = Post {
            id: 2,
            user_id: 5,
            title: "B2".into(),
            body: "new".into(),
        };
        let before = sample();
        let after = apply_update(before.clone(), updated.clone());
        assert_eq!(after.len(), before.len());
        assert_eq!(after[1], updated);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[2]);
    }

    #[test]
    fn update_miss_returns_cache_unchanged() {
        let before = sample();
        let after = apply_update(before.clone(), post(42, "ghost"));
        assert_eq!(after, before);
    }

    #[test]
    fn patch_merges_onto_matching_entry() {
        let before = vec![post(1, "A"), post(2, "B")];
        let after = apply_patch(before.clone(), &PostPatch::title("A*"), 1);
        assert_eq!(after[0].title, "A*");
        assert_eq!(after[0].body, before[0].body);
        assert_eq!(after[0].user_id, before[0].user_id);
        assert_eq!(after[1], before[1]);
    }

    #[test]
    fn repeated_create_ids_are_all_synced() {
        // The server hands out the same id to every new post.
        let cache = apply_create(sample(), post(101, "first"));
        let cache = apply_create(cache, post(101, "second"));

        let updated = apply_update(cache.clone(), post(101, "U"));
        let titles: Vec<&str> = updated.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["U", "U", "A", "B", "C"]);

        let patched = apply_patch(cache, &PostPatch::title("P"), 101);
        let titles: Vec<&str> = patched.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["P", "P", "A", "B", "C"]);
        assert_eq!(patched[1].body, "body 101");
    }

    #[test]
    fn patch_miss_is_noop() {
        let before = sample();
        let after = apply_patch(before.clone(), &PostPatch::title("x"), 9);
        assert_eq!(after, before);
    }

    #[test]
    fn delete_removes_and_is_idempotent() {
        let before = vec![post(1, "A"), post(2, "B")];
        let once = apply_delete(before, 1);
        assert_eq!(ids(&once), vec![2]);
        let twice = apply_delete(once.clone(), 1);
        assert_eq!(twice, once);
    }

    #[test]
    fn delete_preserves_order_of_remaining() {
        let after = apply_delete(sample(), 2);
        assert_eq!(ids(&after), vec![1, 3]);
    }

    #[test]
    fn delete_on_empty_cache() {
        assert!(apply_delete(Vec::new(), 1).is_empty());
    }

    #[test]
    fn sync_dispatches_to_transform() {
        let patched = CacheSync::Patched {
            id: 3,
            patch: PostPatch::title("C*"),
        }
        .apply(sample());
        assert_eq!(patched[2].title, "C*");

        let deleted = CacheSync::Deleted(1).apply(sample());
        assert_eq!(ids(&deleted), vec![2, 3]);
    }

    #[test]
    fn sync_reports_target_and_hits() {
        let cache = sample();
        let sync = CacheSync::Updated(post(7, "x"));
        assert_eq!(sync.target_id(), 7);
        assert!(!sync.hits(&cache));
        assert!(CacheSync::Deleted(3).hits(&cache));
        assert!(CacheSync::Created(post(7, "x")).hits(&[]));
        assert_eq!(CacheSync::Deleted(3).kind().as_str(), "delete");
    }
}
