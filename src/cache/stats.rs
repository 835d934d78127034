//! Cache Statistics Module
//!
//! Tracks cache performance counters and builds point-in-time snapshots.

use std::collections::HashMap;

use serde::Serialize;

// == Cache Stats ==
/// Running performance counters, updated as the store operates.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted to make room under the budgets
    pub evictions: u64,
    /// Number of entries dropped because their TTL elapsed
    pub expirations: u64,
    /// Number of snapshot writes that failed
    pub persist_failures: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Record Expiration ==
    /// Increments the expiration counter.
    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    // == Record Persist Failure ==
    /// Increments the failed snapshot write counter.
    pub fn record_persist_failure(&mut self) {
        self.persist_failures += 1;
    }
}

// == Stats Snapshot ==
/// Point-in-time view of the cache, assembled by the store on request.
///
/// Combines the running counters with sizes, budgets, and a walk over the
/// live entries (tag histogram, access-time extremes, expired-but-unswept
/// count). Building one is O(n) over the entries.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    /// Current number of entries, including any not yet swept
    pub total_entries: usize,
    /// Sum of approximate entry sizes in bytes
    pub total_size_bytes: usize,
    /// Configured entry-count budget
    pub max_entries: usize,
    /// Configured byte budget
    pub max_size_bytes: usize,
    /// Byte budget utilization, 0-100
    pub utilization_percent: f64,
    /// Earliest last-access timestamp among live entries
    pub oldest_access_at: Option<u64>,
    /// Latest last-access timestamp among live entries
    pub newest_access_at: Option<u64>,
    /// Entries whose TTL has elapsed but which have not been swept yet
    pub expired_entries: usize,
    /// Number of entries carrying each tag
    pub tag_counts: HashMap<String, usize>,
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted to make room under the budgets
    pub evictions: u64,
    /// Number of entries dropped because their TTL elapsed
    pub expirations: u64,
    /// Number of snapshot writes that failed
    pub persist_failures: u64,
    /// hits / (hits + misses), or 0.0 with no requests
    pub hit_rate: f64,
}
