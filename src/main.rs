//! Forecasty Cache - admin server for the memoizing cache
//!
//! Connects the configured backing store and serves the admin HTTP API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use forecasty_cache::api::create_router;
use forecasty_cache::cache::{BackingStore, MemoCache, MemoryStore, RedisStore};
use forecasty_cache::config::StoreBackend;
use forecasty_cache::{spawn_sweep_task, AppState, Config, StoreFailurePolicy};

/// Main entry point for the cache admin server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the backing store (Redis or in-process)
/// 4. Start the store sweep task when running in-process
/// 5. Serve the admin API until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forecasty_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Forecasty cache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={:?}, freshness={}s, store_ttl={:?}, port={}",
        config.backend, config.freshness_secs, config.store_ttl_secs, config.server_port
    );

    let store_ttl = config.store_ttl();
    let mut sweep_handle: Option<JoinHandle<()>> = None;

    let store: Arc<dyn BackingStore> = match config.backend {
        StoreBackend::Redis => Arc::new(
            RedisStore::connect(&config.redis_url(), store_ttl)
                .await
                .context("failed to connect to Redis")?,
        ),
        StoreBackend::Memory => {
            let memory = Arc::new(MemoryStore::new(config.memory_max_entries, store_ttl));
            if store_ttl.is_some() {
                sweep_handle = Some(spawn_sweep_task(memory.clone(), config.sweep_interval));
            }
            memory
        }
    };

    let policy = if config.bypass_on_store_failure {
        warn!("Store failures will bypass the cache instead of failing calls");
        StoreFailurePolicy::Bypass
    } else {
        StoreFailurePolicy::Propagate
    };

    let cache = MemoCache::new(store, config.freshness())
        .with_failure_policy(policy);
    let app = create_router(AppState::new(cache));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweep task.
async fn shutdown_signal(sweep_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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

    if let Some(handle) = sweep_handle {
        handle.abort();
        warn!("Store sweep task aborted");
    }
}
