//! Sidecache - An in-process cache server
//!
//! Serves a JSON cache with TTL expiration, tagged invalidation, LRU
//! eviction and snapshot persistence over HTTP.

use std::net::SocketAddr;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sidecache::api::create_router;
use sidecache::cache::CacheStore;
use sidecache::{spawn_cleanup_task, AppState, Config};

/// Main entry point for the Sidecache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the cache store, restoring a snapshot if one exists
/// 4. Start background TTL cleanup task
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM, persisting on exit
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sidecache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Sidecache Server");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: max_entries={}, max_size_bytes={}, default_ttl={}ms, port={}, cleanup_interval={}s",
        config.max_entries,
        config.max_size_bytes,
        config.default_ttl_ms,
        config.server_port,
        config.cleanup_interval
    );

    // Create application state, restoring the snapshot when configured.
    // A broken snapshot should not keep the server down, so fall back to
    // an empty store and log what happened.
    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(error) => {
            warn!(error = %error, "failed to restore snapshot, starting empty");
            AppState::new(CacheStore::new(config.cache_config()))
        }
    };
    info!(
        "Cache store initialized with {} entries",
        state.cache.read().await.len()
    );

    // Start background cleanup task
    let cleanup_handle = spawn_cleanup_task(state.cache.clone(), config.cleanup_interval);
    info!("Background cleanup task started");

    // Create router with all endpoints
    let app = create_router(state.clone());

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await?;

    // Write a final snapshot so the next start restores current state
    if let Err(error) = state.cache.read().await.persist() {
        warn!(error = %error, "failed to persist snapshot on shutdown");
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    // Abort the cleanup task
    cleanup_handle.abort();
    warn!("Cleanup task aborted");
}
