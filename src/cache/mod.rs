//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, LRU eviction under byte
//! and entry-count budgets, tag invalidation, and snapshot persistence.

mod config;
mod entry;
mod lru;
mod persist;
mod size;
mod stats;
mod store;


// Re-export public types
pub use config::{CacheConfig, SetOptions};
pub use entry::CacheEntry;
pub use lru::AccessOrder;
pub use size::approximate_size;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Size charged to a value whose footprint cannot be measured
pub const FALLBACK_VALUE_SIZE: usize = 1024;
