//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::Value;

use super::size::approximate_size;

// == Cache Entry ==
/// Represents a single cache entry with its value and bookkeeping metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored JSON value
    pub data: Value,
    /// Expiration timestamp (Unix milliseconds); every entry expires
    pub expires_at: u64,
    /// Last read or write timestamp (Unix milliseconds), drives LRU ordering
    pub last_accessed_at: u64,
    /// Approximate in-memory footprint of `data`
    pub size_bytes: usize,
    /// Invalidation tags attached at insert time
    pub tags: Vec<String>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` from now.
    ///
    /// The entry's size is measured once here and never recomputed, so the
    /// store can keep an exact running total without rescanning values.
    /// A TTL too large to represent in milliseconds clamps to a far-future
    /// deadline instead of wrapping. Duplicate tags collapse to one.
    pub fn new(data: Value, ttl: Duration, mut tags: Vec<String>) -> Self {
        let now = current_timestamp_ms();
        let size_bytes = approximate_size(&data);
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        tags.sort();
        tags.dedup();

        Self {
            data,
            expires_at: now.saturating_add(ttl_ms),
            last_accessed_at: now,
            size_bytes,
            tags,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at the given instant.
    ///
    /// Boundary condition: an entry is considered expired when `now_ms` is
    /// greater than or equal to the expiration time. Once the TTL duration has
    /// fully elapsed, the entry is immediately expired.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }

    /// Checks if the entry has expired right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    // == Access Tracking ==
    /// Marks the entry as accessed at the given instant.
    pub fn touch(&mut self, now_ms: u64) {
        self.last_accessed_at = now_ms;
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or 0 if the entry has expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.expires_at.saturating_sub(current_timestamp_ms())
    }

    // == Tags ==
    /// Checks whether the entry carries the given invalidation tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
