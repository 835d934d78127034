//! Cache Configuration Module
//!
//! Tuning knobs for a store instance and per-insert options.

use std::path::PathBuf;
use std::time::Duration;

// == Cache Config ==
/// Limits and defaults for one cache instance.
///
/// Each store owns its config; there is no process-wide instance. Callers
/// that want several independently-budgeted caches construct several stores.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL applied when an insert does not specify one
    pub default_ttl: Duration,
    /// Byte budget across all entries
    pub max_size_bytes: usize,
    /// Entry-count budget
    pub max_entries: usize,
    /// Snapshot file location; None disables persistence entirely
    pub persist_path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(5 * 60),
            max_size_bytes: 10 * 1024 * 1024,
            max_entries: 1000,
            persist_path: None,
        }
    }
}

// == Set Options ==
/// Per-insert options for [`CacheStore::set`](super::CacheStore::set).
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    /// Overrides the store's default TTL when set
    pub ttl: Option<Duration>,
    /// Invalidation tags attached to the entry
    pub tags: Vec<String>,
}

impl SetOptions {
    /// Creates empty options: default TTL, no tags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an explicit TTL for this entry.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Attaches one invalidation tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Attaches several invalidation tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}
