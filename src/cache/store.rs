//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU eviction, TTL
//! expiration, tag invalidation, and optional snapshot persistence.

use std::collections::HashMap;
use std::future::Future;

use serde_json::Value;
use tracing::warn;

use super::config::{CacheConfig, SetOptions};
use super::entry::{current_timestamp_ms, CacheEntry};
use super::lru::AccessOrder;
use super::persist;
use super::stats::{CacheStats, StatsSnapshot};
use super::MAX_KEY_LENGTH;
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Main cache storage with byte and entry-count budgets.
///
/// Expired entries are dropped lazily when an access discovers them; callers
/// that want bounded staleness run [`cleanup`](CacheStore::cleanup) on a
/// timer. The running size total is maintained incrementally, so budget
/// checks never rescan the entries.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    order: AccessOrder,
    /// Performance counters
    stats: CacheStats,
    /// Sum of approximate entry sizes
    total_size_bytes: usize,
    /// Budgets, default TTL, and snapshot location
    config: CacheConfig,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store with the given configuration.
    ///
    /// Nothing is read from disk; use [`open`](CacheStore::open) to restore
    /// a persisted snapshot.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            order: AccessOrder::new(),
            stats: CacheStats::new(),
            total_size_bytes: 0,
            config,
        }
    }

    // == Open ==
    /// Creates a store and loads the snapshot at `persist_path`, if any.
    ///
    /// Entries already expired in the snapshot are dropped. Loaded entries
    /// are ordered by their persisted last-access time, so eviction picks up
    /// where the previous process left off. If the snapshot no longer fits
    /// the configured budgets, oldest entries are evicted until it does.
    pub fn open(config: CacheConfig) -> Result<Self> {
        let mut store = Self::new(config);

        let Some(path) = store.config.persist_path.clone() else {
            return Ok(store);
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let now = current_timestamp_ms();
        let mut loaded: Vec<(String, CacheEntry)> =
            persist::load_snapshot(&path, now)?.into_iter().collect();
        loaded.sort_by_key(|(_, entry)| entry.last_accessed_at);

        for (key, entry) in loaded {
            store.total_size_bytes += entry.size_bytes;
            store.order.touch(&key);
            store.entries.insert(key, entry);
        }
        store.evict_until_fits(0, 0);

        Ok(store)
    }

    // == Set ==
    /// Stores a value under `key`, evicting older entries if needed.
    ///
    /// If the key already exists, the value is overwritten and its TTL and
    /// tags are reset. Eviction happens before insertion, so the new entry
    /// can never be the victim of its own insert.
    ///
    /// # Arguments
    /// * `key` - Non-empty key, at most [`MAX_KEY_LENGTH`] bytes
    /// * `value` - The JSON value to store
    /// * `options` - TTL override and invalidation tags
    pub fn set(&mut self, key: &str, value: Value, options: SetOptions) -> Result<()> {
        // Validate the key
        if key.is_empty() {
            return Err(CacheError::InvalidRequest(
                "Key cannot be empty".to_string(),
            ));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidRequest(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        // Use provided TTL or the store default
        let ttl = options.ttl.unwrap_or(self.config.default_ttl);
        if ttl.is_zero() {
            return Err(CacheError::InvalidRequest(
                "TTL must be positive".to_string(),
            ));
        }

        let entry = CacheEntry::new(value, ttl, options.tags);

        // A value larger than the whole byte budget can never be admitted
        if entry.size_bytes > self.config.max_size_bytes {
            return Err(CacheError::EntryTooLarge {
                size: entry.size_bytes,
                max: self.config.max_size_bytes,
            });
        }

        // Free the old entry's accounting before checking budgets
        self.remove_entry(key);

        if !self.evict_until_fits(entry.size_bytes, 1) {
            return Err(CacheError::CacheFull(
                "Cache cannot make room for the new entry".to_string(),
            ));
        }

        self.total_size_bytes += entry.size_bytes;
        self.entries.insert(key.to_string(), entry);
        self.order.touch(key);

        self.persist_after_mutation();
        Ok(())
    }

    // == Get ==
    /// Retrieves the value stored under `key`.
    ///
    /// Returns None for a missing key and for an expired one; an expired
    /// entry is removed on discovery. A successful read refreshes the
    /// entry's LRU position.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let now = current_timestamp_ms();

        let Some(entry) = self.entries.get_mut(key) else {
            self.stats.record_miss();
            return None;
        };

        if entry.is_expired_at(now) {
            self.remove_entry(key);
            self.stats.record_expiration();
            self.stats.record_miss();
            return None;
        }

        entry.touch(now);
        let value = entry.data.clone();
        self.order.touch(key);
        self.stats.record_hit();
        Some(value)
    }

    // == Get Or Fetch ==
    /// Returns the cached value for `key`, fetching and caching it on a miss.
    ///
    /// The fetch closure runs only when the key is absent or expired. A
    /// fetch error is returned as-is and nothing is cached, so the next call
    /// retries. If the fetched value itself cannot be cached (for example it
    /// exceeds the byte budget), the value is still returned and the failure
    /// is logged.
    ///
    /// Concurrent callers missing on the same key each run their own fetch;
    /// the last completed insert wins.
    pub async fn get_or_fetch<F, Fut, E>(
        &mut self,
        key: &str,
        options: SetOptions,
        fetch: F,
    ) -> std::result::Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Value, E>>,
    {
        self.get_or_fetch_with(key, options, fetch, |value| value.clone())
            .await
    }

    /// Like [`get_or_fetch`](CacheStore::get_or_fetch), applying `transform`
    /// to the value before returning it.
    ///
    /// The cache always stores the untransformed value; the transform runs
    /// on every call, for cached and freshly fetched values alike.
    pub async fn get_or_fetch_with<F, Fut, E, T>(
        &mut self,
        key: &str,
        options: SetOptions,
        fetch: F,
        transform: T,
    ) -> std::result::Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Value, E>>,
        T: Fn(&Value) -> Value,
    {
        if let Some(cached) = self.get(key) {
            return Ok(transform(&cached));
        }

        let fetched = fetch().await?;
        if let Err(error) = self.set(key, fetched.clone(), options) {
            warn!(key, error = %error, "fetched value could not be cached");
        }
        Ok(transform(&fetched))
    }

    // == Remove ==
    /// Removes an entry by key.
    ///
    /// Returns true if an entry was present, expired or not.
    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key).is_some();
        if removed {
            self.persist_after_mutation();
        }
        removed
    }

    // == Clear By Tag ==
    /// Removes every entry carrying the given tag.
    ///
    /// Returns the number of entries removed. Unknown tags remove nothing.
    pub fn clear_by_tag(&mut self, tag: &str) -> usize {
        let tagged: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.has_tag(tag))
            .map(|(key, _)| key.clone())
            .collect();

        let count = tagged.len();
        for key in tagged {
            self.remove_entry(&key);
        }

        if count > 0 {
            self.persist_after_mutation();
        }
        count
    }

    // == Cleanup ==
    /// Removes all expired entries.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup(&mut self) -> usize {
        let now = current_timestamp_ms();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired.len();
        for key in expired {
            self.remove_entry(&key);
            self.stats.record_expiration();
        }

        if count > 0 {
            self.persist_after_mutation();
        }
        count
    }

    // == Stats ==
    /// Builds a point-in-time snapshot of counters, sizes, and tag usage.
    pub fn stats(&self) -> StatsSnapshot {
        let now = current_timestamp_ms();

        let mut tag_counts: HashMap<String, usize> = HashMap::new();
        let mut expired_entries = 0;
        let mut oldest_access_at: Option<u64> = None;
        let mut newest_access_at: Option<u64> = None;

        for entry in self.entries.values() {
            if entry.is_expired_at(now) {
                expired_entries += 1;
            }
            for tag in &entry.tags {
                *tag_counts.entry(tag.clone()).or_insert(0) += 1;
            }
            oldest_access_at =
                Some(oldest_access_at.map_or(entry.last_accessed_at, |t| {
                    t.min(entry.last_accessed_at)
                }));
            newest_access_at =
                Some(newest_access_at.map_or(entry.last_accessed_at, |t| {
                    t.max(entry.last_accessed_at)
                }));
        }

        let utilization_percent = if self.config.max_size_bytes == 0 {
            0.0
        } else {
            self.total_size_bytes as f64 / self.config.max_size_bytes as f64 * 100.0
        };

        StatsSnapshot {
            total_entries: self.entries.len(),
            total_size_bytes: self.total_size_bytes,
            max_entries: self.config.max_entries,
            max_size_bytes: self.config.max_size_bytes,
            utilization_percent,
            oldest_access_at,
            newest_access_at,
            expired_entries,
            tag_counts,
            hits: self.stats.hits,
            misses: self.stats.misses,
            evictions: self.stats.evictions,
            expirations: self.stats.expirations,
            persist_failures: self.stats.persist_failures,
            hit_rate: self.stats.hit_rate(),
        }
    }

    // == TTL Remaining ==
    /// Returns the remaining TTL for a key without refreshing its LRU
    /// position, or None if the key is absent.
    pub fn ttl_remaining_ms(&self, key: &str) -> Option<u64> {
        self.entries.get(key).map(CacheEntry::ttl_remaining_ms)
    }

    // == Persist ==
    /// Writes the current contents to the configured snapshot file.
    ///
    /// A store without a `persist_path` returns Ok without touching disk.
    /// Unlike the automatic snapshot after each mutation, errors here reach
    /// the caller.
    pub fn persist(&self) -> Result<()> {
        match &self.config.persist_path {
            Some(path) => persist::save_snapshot(path, &self.entries),
            None => Ok(()),
        }
    }

    // == Length ==
    /// Returns the current number of entries, including expired ones not
    /// yet discovered.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Internal Helpers ==
    /// Removes an entry and its order and size accounting.
    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.total_size_bytes = self.total_size_bytes.saturating_sub(entry.size_bytes);
        self.order.remove(key);
        Some(entry)
    }

    /// Evicts least recently used entries until `pending_bytes` and
    /// `pending_entries` fit under the budgets. Returns false if the budgets
    /// still cannot be met with the cache empty.
    fn evict_until_fits(&mut self, pending_bytes: usize, pending_entries: usize) -> bool {
        while self.over_budget(pending_bytes, pending_entries) {
            match self.order.evict_oldest() {
                Some(victim) => {
                    self.remove_entry(&victim);
                    self.stats.record_eviction();
                }
                None => return false,
            }
        }
        true
    }

    fn over_budget(&self, pending_bytes: usize, pending_entries: usize) -> bool {
        self.entries.len() + pending_entries > self.config.max_entries
            || self.total_size_bytes.saturating_add(pending_bytes) > self.config.max_size_bytes
    }

    /// Best-effort snapshot write after a mutation. Failures are counted and
    /// logged; the in-memory state is already updated and stays authoritative.
    fn persist_after_mutation(&mut self) {
        let Some(path) = &self.config.persist_path else {
            return;
        };
        if let Err(error) = persist::save_snapshot(path, &self.entries) {
            self.stats.record_persist_failure();
            warn!(path = %path.display(), error = %error, "failed to write cache snapshot");
        }
    }
}
