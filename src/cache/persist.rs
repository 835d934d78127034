//! Snapshot Persistence Module
//!
//! Reads and writes the on-disk snapshot of the cache contents.
//!
//! The snapshot is a single JSON object mapping each key to a compact record.
//! Field names are shortened to keep the file small, since every mutation
//! rewrites the whole map. Entry sizes are not persisted; they are measured
//! again on load.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entry::CacheEntry;
use super::size::approximate_size;
use crate::error::Result;

// == Persisted Entry ==
/// On-disk form of one cache entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedEntry {
    /// Stored value
    #[serde(rename = "d")]
    pub data: Value,
    /// Expiration timestamp (Unix milliseconds)
    #[serde(rename = "e")]
    pub expires_at: u64,
    /// Last access timestamp (Unix milliseconds)
    #[serde(rename = "la")]
    pub last_accessed_at: u64,
    /// Invalidation tags
    #[serde(rename = "t")]
    pub tags: Vec<String>,
}

impl From<&CacheEntry> for PersistedEntry {
    fn from(entry: &CacheEntry) -> Self {
        Self {
            data: entry.data.clone(),
            expires_at: entry.expires_at,
            last_accessed_at: entry.last_accessed_at,
            tags: entry.tags.clone(),
        }
    }
}

impl From<PersistedEntry> for CacheEntry {
    fn from(record: PersistedEntry) -> Self {
        let size_bytes = approximate_size(&record.data);
        Self {
            data: record.data,
            expires_at: record.expires_at,
            last_accessed_at: record.last_accessed_at,
            size_bytes,
            tags: record.tags,
        }
    }
}

// == Save Snapshot ==
/// Serializes the full entry map to `path`, replacing any previous snapshot.
pub fn save_snapshot(path: &Path, entries: &HashMap<String, CacheEntry>) -> Result<()> {
    let snapshot: HashMap<&String, PersistedEntry> = entries
        .iter()
        .map(|(key, entry)| (key, PersistedEntry::from(entry)))
        .collect();
    let json = serde_json::to_string(&snapshot)?;
    fs::write(path, json)?;
    Ok(())
}

// == Load Snapshot ==
/// Reads the snapshot at `path` and rebuilds the entry map.
///
/// A missing file yields an empty map. Records already expired at `now_ms`
/// are dropped rather than resurrected. An unreadable or unparsable file is
/// an error; the caller decides whether to start empty instead.
pub fn load_snapshot(path: &Path, now_ms: u64) -> Result<HashMap<String, CacheEntry>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let raw = fs::read_to_string(path)?;
    let snapshot: HashMap<String, PersistedEntry> = serde_json::from_str(&raw)?;

    let mut entries = HashMap::with_capacity(snapshot.len());
    for (key, record) in snapshot {
        if now_ms >= record.expires_at {
            continue;
        }
        entries.insert(key, CacheEntry::from(record));
    }
    Ok(entries)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::entry::current_timestamp_ms;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::tempdir;

    fn sample_entry(value: Value, ttl_secs: u64, tags: Vec<String>) -> CacheEntry {
        CacheEntry::new(value, Duration::from_secs(ttl_secs), tags)
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snapshot.json");

        let mut entries = HashMap::new();
        entries.insert(
            "user:1".to_string(),
            sample_entry(json!({"name": "Ada"}), 60, vec!["user".to_string()]),
        );
        entries.insert("count".to_string(), sample_entry(json!(42), 60, vec![]));

        save_snapshot(&path, &entries).unwrap();
        let loaded = load_snapshot(&path, current_timestamp_ms()).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded["user:1"].data, json!({"name": "Ada"}));
        assert_eq!(loaded["user:1"].tags, vec!["user".to_string()]);
        assert_eq!(loaded["count"].data, json!(42));
        // Size is recomputed from the value on load
        assert_eq!(loaded["count"].size_bytes, approximate_size(&json!(42)));
    }

    #[test]
    fn test_snapshot_uses_compact_field_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snapshot.json");

        let mut entries = HashMap::new();
        entries.insert("k".to_string(), sample_entry(json!("v"), 60, vec![]));

        save_snapshot(&path, &entries).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();

        assert!(raw.contains("\"d\""));
        assert!(raw.contains("\"e\""));
        assert!(raw.contains("\"la\""));
        assert!(raw.contains("\"t\""));
        assert!(!raw.contains("expires_at"));
    }

    #[test]
    fn test_load_missing_file_returns_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("does_not_exist.json");

        let loaded = load_snapshot(&path, current_timestamp_ms()).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_load_drops_expired_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let now = current_timestamp_ms();

        let mut entries = HashMap::new();
        entries.insert("live".to_string(), sample_entry(json!(1), 60, vec![]));
        let mut stale = sample_entry(json!(2), 60, vec![]);
        stale.expires_at = now.saturating_sub(1_000);
        entries.insert("stale".to_string(), stale);

        save_snapshot(&path, &entries).unwrap();
        let loaded = load_snapshot(&path, now).unwrap();

        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key("live"));
        assert!(!loaded.contains_key("stale"));
    }

    #[test]
    fn test_load_expired_at_boundary_is_dropped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let now = current_timestamp_ms();

        let mut entry = sample_entry(json!(1), 60, vec![]);
        entry.expires_at = now;
        let mut entries = HashMap::new();
        entries.insert("edge".to_string(), entry);

        save_snapshot(&path, &entries).unwrap();
        let loaded = load_snapshot(&path, now).unwrap();

        assert!(loaded.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, "{not valid json").unwrap();

        let result = load_snapshot(&path, current_timestamp_ms());
        assert!(result.is_err());
    }
}
