//! Mutation lifecycle.
//!
//! `Idle → Pending → Success → CacheSyncApplied`, or `Pending → Failed`.
//! A failed mutation never touches the cache and is never retried here.

use std::fmt;

use tracing::debug;

use crate::cache::SyncKind;
use crate::domain::error::DomainError;
use crate::domain::posts::PostId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Idle,
    Pending,
    Success,
    CacheSyncApplied,
    Failed,
}

impl MutationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Success => "success",
            Self::CacheSyncApplied => "cache_sync_applied",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::CacheSyncApplied | Self::Failed)
    }

    fn can_move_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Pending)
                | (Self::Pending, Self::Success)
                | (Self::Pending, Self::Failed)
                | (Self::Success, Self::CacheSyncApplied)
        )
    }
}

impl fmt::Display for MutationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks one mutation instance through its lifecycle.
#[derive(Debug, Clone)]
pub struct Mutation {
    kind: SyncKind,
    post_id: Option<PostId>,
    state: MutationState,
}

impl Mutation {
    /// `post_id` is `None` for creates, whose id is assigned by the server.
    pub fn new(kind: SyncKind, post_id: Option<PostId>) -> Self {
        Self {
            kind,
            post_id,
            state: MutationState::Idle,
        }
    }

    pub fn kind(&self) -> SyncKind {
        self.kind
    }

    pub fn post_id(&self) -> Option<PostId> {
        self.post_id
    }

    pub fn state(&self) -> MutationState {
        self.state
    }

    pub fn start(&mut self) -> Result<(), DomainError> {
        self.transition(MutationState::Pending)
    }

    pub fn succeed(&mut self) -> Result<(), DomainError> {
        self.transition(MutationState::Success)
    }

    pub fn mark_synced(&mut self) -> Result<(), DomainError> {
        self.transition(MutationState::CacheSyncApplied)
    }

    pub fn fail(&mut self) -> Result<(), DomainError> {
        self.transition(MutationState::Failed)
    }

    fn transition(&mut self, next: MutationState) -> Result<(), DomainError> {
        if !self.state.can_move_to(next) {
            return Err(DomainError::invariant(format!(
                "{} mutation cannot move from {} to {}",
                self.kind.as_str(),
                self.state,
                next
            )));
        }
        debug!(
            mutation = self.kind.as_str(),
            post_id = self.post_id,
            from = self.state.as_str(),
            to = next.as_str(),
            "Mutation state changed"
        );
        self.state = next;
        Ok(())
    }
}
