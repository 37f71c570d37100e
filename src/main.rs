//! Weather Cache - weather records API with a fail-open cache-aside layer
//!
//! Serves weather records from SQLite, fronted by Redis (or an in-process
//! cache) for reads and write deduplication.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weather_cache::api::create_router;
use weather_cache::cache::{CacheBackend, MemoryBackend, RedisBackend};
use weather_cache::config::{CacheBackendKind, Config};
use weather_cache::store::SqliteStore;
use weather_cache::{spawn_cleanup_task, AppState};

/// Main entry point for the weather service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the record store, creating the schema if needed
/// 4. Create the cache backend (Redis connects lazily on first use)
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Weather Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={:?}, ttl={}s, cache_timeout={}ms, database={}, port={}",
        config.cache_backend,
        config.cache_ttl,
        config.cache_timeout_ms,
        config.database_path,
        config.server_port
    );

    let store = Arc::new(
        SqliteStore::open(&config.database_path).context("Failed to open record store")?,
    );
    info!("Record store ready");

    let (cache, cleanup_handle): (Arc<dyn CacheBackend>, Option<JoinHandle<()>>) =
        match config.cache_backend {
            CacheBackendKind::Redis => {
                let redis = RedisBackend::new(&config.cache_url, config.cache_timeout())
                    .context("Invalid cache URL")?;
                info!("Redis cache backend configured for {}", config.cache_url);
                let cache: Arc<dyn CacheBackend> = Arc::new(redis);
                (cache, None)
            }
            CacheBackendKind::Memory => {
                let memory = Arc::new(MemoryBackend::new());
                let handle = spawn_cleanup_task(memory.clone(), config.cleanup_interval);
                info!("Memory cache backend started");
                let cache: Arc<dyn CacheBackend> = memory;
                (cache, Some(handle))
            }
        };

    let state = AppState::from_backends(cache, store, &config);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task if one is running.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
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

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
}
