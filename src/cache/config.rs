//! Query cache configuration.
//!
//! Controlled via the `[cache]` table of `postboard.toml`.

use std::num::NonZeroUsize;

use serde::Deserialize;

const DEFAULT_COMMENT_LIMIT: usize = 64;
const DEFAULT_SYNC_LOG_LIMIT: usize = 256;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of per-post comment lists kept in the LRU.
    pub comment_limit: usize,
    /// Maximum number of applied syncs retained by the sync log.
    pub sync_log_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            comment_limit: DEFAULT_COMMENT_LIMIT,
            sync_log_limit: DEFAULT_SYNC_LOG_LIMIT,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            comment_limit: settings.comment_limit.get(),
            sync_log_limit: settings.sync_log_limit.get(),
        }
    }
}

impl CacheConfig {
    /// Returns the comment limit as NonZeroUsize, clamping to 1 if zero.
    pub fn comment_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.comment_limit).unwrap_or(NonZeroUsize::MIN)
    }

    /// Returns the sync log limit as NonZeroUsize, clamping to 1 if zero.
    pub fn sync_log_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.sync_log_limit).unwrap_or(NonZeroUsize::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert_eq!(config.comment_limit, 64);
        assert_eq!(config.sync_log_limit, 256);
    }

    #[test]
    fn non_zero_clamps_to_min() {
        let config = CacheConfig {
            comment_limit: 0,
            sync_log_limit: 0,
        };
        assert_eq!(config.comment_limit_non_zero().get(), 1);
        assert_eq!(config.sync_log_limit_non_zero().get(), 1);
    }
}
