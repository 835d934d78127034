//! Access Order Module
//!
//! Tracks least-recently-used order for cache eviction.

use std::collections::{BTreeMap, HashMap};

// == Access Order ==
/// Tracks access order for the LRU eviction strategy.
///
/// Every touch assigns the key a fresh stamp from a monotonic counter. The
/// stamp map orders keys oldest-first, so finding the eviction victim is a
/// lookup at the low end rather than a scan or re-sort:
/// - Lowest stamp = least recently used
/// - Highest stamp = most recently used
#[derive(Debug, Default)]
pub struct AccessOrder {
    /// Current stamp per key
    stamps: HashMap<String, u64>,
    /// Keys ordered by stamp, oldest first
    by_stamp: BTreeMap<u64, String>,
    /// Monotonic counter, incremented on every touch
    clock: u64,
}

impl AccessOrder {
    // == Constructor ==
    /// Creates a new empty access tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used.
    ///
    /// An existing key is re-stamped; a new key starts tracking here.
    pub fn touch(&mut self, key: &str) {
        if let Some(previous) = self.stamps.get(key) {
            self.by_stamp.remove(previous);
        }
        self.clock += 1;
        self.stamps.insert(key.to_string(), self.clock);
        self.by_stamp.insert(self.clock, key.to_string());
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        if let Some(stamp) = self.stamps.remove(key) {
            self.by_stamp.remove(&stamp);
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if the tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.by_stamp.pop_first()?;
        self.stamps.remove(&key);
        Some(key)
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&String> {
        self.by_stamp.values().next()
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    // == Contains ==
    /// Checks if a key is being tracked.
    pub fn contains(&self, key: &str) -> bool {
        self.stamps.contains_key(key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_new() {
        let order = AccessOrder::new();
        assert!(order.is_empty());
        assert_eq!(order.len(), 0);
    }

    #[test]
    fn test_order_touch_new_key() {
        let mut order = AccessOrder::new();

        order.touch("key1");
        order.touch("key2");
        order.touch("key3");

        assert_eq!(order.len(), 3);
        // key1 is oldest (touched first)
        assert_eq!(order.peek_oldest(), Some(&"key1".to_string()));
    }

    #[test]
    fn test_order_touch_existing_key() {
        let mut order = AccessOrder::new();

        order.touch("key1");
        order.touch("key2");
        order.touch("key3");

        // Touch key1 again - it becomes most recent
        order.touch("key1");

        assert_eq!(order.len(), 3);
        // key2 is now oldest
        assert_eq!(order.peek_oldest(), Some(&"key2".to_string()));
    }

    #[test]
    fn test_order_evict_oldest() {
        let mut order = AccessOrder::new();

        order.touch("key1");
        order.touch("key2");
        order.touch("key3");

        let evicted = order.evict_oldest();
        assert_eq!(evicted, Some("key1".to_string()));
        assert_eq!(order.len(), 2);

        let evicted = order.evict_oldest();
        assert_eq!(evicted, Some("key2".to_string()));
        assert_eq!(order.len(), 1);
    }

    #[test]
    fn test_order_evict_empty() {
        let mut order = AccessOrder::new();
        assert_eq!(order.evict_oldest(), None);
    }

    #[test]
    fn test_order_remove() {
        let mut order = AccessOrder::new();

        order.touch("key1");
        order.touch("key2");
        order.touch("key3");

        order.remove("key2");

        assert_eq!(order.len(), 2);
        assert!(!order.contains("key2"));
        assert!(order.contains("key1"));
        assert!(order.contains("key3"));
    }

    #[test]
    fn test_order_after_multiple_touches() {
        let mut order = AccessOrder::new();

        // Insert a, b, c then re-touch in the order a, c, b
        order.touch("a");
        order.touch("b");
        order.touch("c");

        order.touch("a");
        order.touch("c");
        order.touch("b");

        // Eviction runs oldest to newest: a, c, b
        assert_eq!(order.evict_oldest(), Some("a".to_string()));
        assert_eq!(order.evict_oldest(), Some("c".to_string()));
        assert_eq!(order.evict_oldest(), Some("b".to_string()));
    }

    #[test]
    fn test_order_remove_nonexistent_key() {
        let mut order = AccessOrder::new();

        order.touch("key1");
        order.touch("key2");

        // Removing an untracked key is a no-op
        order.remove("nonexistent");

        assert_eq!(order.len(), 2);
        assert!(order.contains("key1"));
        assert!(order.contains("key2"));
    }

    #[test]
    fn test_order_touch_same_key_multiple_times() {
        let mut order = AccessOrder::new();

        order.touch("key1");
        order.touch("key1");
        order.touch("key1");

        // Still a single tracked key
        assert_eq!(order.len(), 1);
        assert_eq!(order.evict_oldest(), Some("key1".to_string()));
        assert!(order.is_empty());
    }

    #[test]
    fn test_order_stamps_stay_in_sync() {
        let mut order = AccessOrder::new();

        order.touch("a");
        order.touch("b");
        order.touch("a");
        order.remove("b");

        // Only one live stamp per key after re-touches and removals
        assert_eq!(order.len(), 1);
        assert_eq!(order.peek_oldest(), Some(&"a".to_string()));
        assert_eq!(order.evict_oldest(), Some("a".to_string()));
        assert_eq!(order.evict_oldest(), None);
    }

    #[test]
    fn test_order_touch_protects_from_eviction() {
        let mut order = AccessOrder::new();

        order.touch("a");
        order.touch("b");
        order.touch("c");

        // 'a' is oldest
        assert_eq!(order.peek_oldest(), Some(&"a".to_string()));

        // Touching 'a' makes 'b' the eviction victim
        order.touch("a");

        assert_eq!(order.peek_oldest(), Some(&"b".to_string()));
        assert_eq!(order.evict_oldest(), Some("b".to_string()));
        assert_eq!(order.evict_oldest(), Some("c".to_string()));
        assert_eq!(order.evict_oldest(), Some("a".to_string()));
    }
}
