//! Sidecache - An in-process JSON cache with TTL expiration, tagged
//! invalidation, LRU eviction and optional snapshot persistence.
//!
//! The cache can be embedded directly or exposed over HTTP via [`api`].
//!
//! ```
//! use sidecache::cache::{CacheConfig, CacheStore, SetOptions};
//! use serde_json::json;
//!
//! let mut cache = CacheStore::new(CacheConfig::default());
//! cache.set("user:1", json!({"name": "Ada"}), SetOptions::new()).unwrap();
//! assert_eq!(cache.get("user:1"), Some(json!({"name": "Ada"})));
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheConfig, CacheStore, SetOptions, StatsSnapshot};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
