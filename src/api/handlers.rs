//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{CacheStore, SetOptions, StatsSnapshot};
use crate::error::{CacheError, Result};
use crate::models::{
    CleanupResponse, DeleteResponse, GetResponse, HealthResponse, PurgeResponse, SetRequest,
    SetResponse,
};

/// Application state shared across all handlers.
///
/// Contains the cache store wrapped in Arc<RwLock<>> for thread-safe access.
/// Each server owns its state; nothing here is process-global, so tests and
/// embedders can run several independent caches side by side.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache store
    pub cache: Arc<RwLock<CacheStore>>,
}

impl AppState {
    /// Creates a new AppState with the given cache store.
    pub fn new(cache: CacheStore) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Opens the cache store, loading a persisted snapshot when one is
    /// configured. Fails if an existing snapshot cannot be read.
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        let cache = CacheStore::open(config.cache_config())?;
        Ok(Self::new(cache))
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair in the cache with optional TTL and tags.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    // Validate request
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let SetRequest {
        key,
        value,
        ttl_ms,
        tags,
    } = req;
    let options = SetOptions {
        ttl: ttl_ms.map(Duration::from_millis),
        tags,
    };

    // Acquire write lock and set the value
    let mut cache = state.cache.write().await;
    cache.set(&key, value, options)?;

    Ok(Json(SetResponse::new(key)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key. Misses and lazily-expired
/// entries both surface as 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    // Acquire write lock (needed for LRU touch and stats update)
    let mut cache = state.cache.write().await;
    match cache.get(&key) {
        Some(value) => {
            let expires_in_ms = cache.ttl_remaining_ms(&key).unwrap_or(0);
            Ok(Json(GetResponse::new(key, value, expires_in_ms)))
        }
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
///
/// Deletes a key from the cache.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    // Acquire write lock
    let mut cache = state.cache.write().await;
    if !cache.remove(&key) {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /tag/:tag
///
/// Removes every entry carrying the given tag. Clearing an unknown tag is
/// not an error; the response reports zero removals.
pub async fn purge_tag_handler(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Json<PurgeResponse> {
    let mut cache = state.cache.write().await;
    let removed = cache.clear_by_tag(&tag);

    Json(PurgeResponse::new(tag, removed))
}

/// Handler for POST /cleanup
///
/// Sweeps expired entries immediately instead of waiting for the
/// background task.
pub async fn cleanup_handler(State(state): State<AppState>) -> Json<CleanupResponse> {
    let mut cache = state.cache.write().await;
    let removed = cache.cleanup();

    Json(CleanupResponse::new(removed))
}

/// Handler for GET /stats
///
/// Returns a snapshot of cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsSnapshot> {
    // Acquire read lock for stats
    let cache = state.cache.read().await;
    Json(cache.stats())
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
