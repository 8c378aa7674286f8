//! livepath server: real-time path publishing.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use livepath_core::config::AppConfig;
use livepath_core::error::AppError;
use livepath_core::traits::cache::CacheProvider;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `config/default.toml`, the `LIVEPATH_ENV`
/// overlay, and `LIVEPATH__*` environment variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("LIVEPATH_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting livepath v{}", env!("CARGO_PKG_VERSION"));
    let config = Arc::new(config);

    // ── Step 1: Initialize cache ─────────────────────────────────
    tracing::info!(
        "Initializing cache (provider: {}, ttl: {}s)...",
        config.cache.provider,
        config.cache.ttl_seconds
    );
    let cache: Arc<dyn CacheProvider> =
        Arc::new(livepath_cache::CacheManager::new(&config.cache).await?);

    // ── Step 2: Register paths ───────────────────────────────────
    let services = livepath_service::ServiceContext::from_config(&config, cache)?;
    for entry in services.registry.list_all() {
        tracing::info!(path = %entry.name, kind = entry.producer.kind(), "Path available");
    }

    // ── Step 3: Initialize realtime engine ───────────────────────
    let realtime = livepath_realtime::RealtimeEngine::new(
        config.realtime.clone(),
        Arc::clone(&services.registry),
    );

    // ── Step 4: Start broadcast loop ─────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let broadcast_handle = if config.broadcast.enabled {
        let broadcast = livepath_worker::BroadcastLoop::new(
            Arc::clone(&realtime.channels),
            services.refresher.clone(),
            Arc::new(realtime.sink()),
            config.broadcast.interval(),
        );
        Some(tokio::spawn(async move { broadcast.run(shutdown_rx).await }))
    } else {
        tracing::info!("Broadcast loop disabled");
        None
    };

    // ── Step 5: Build application state and router ───────────────
    let app_state = livepath_api::AppState::new(Arc::clone(&config), services, realtime.clone());
    let app = livepath_api::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("livepath listening on {}", addr);

    // ── Step 6: Graceful shutdown ────────────────────────────────
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
        realtime.shutdown();
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 7: Wait for background tasks ────────────────────────
    if let Some(handle) = broadcast_handle {
        let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
        if tokio::time::timeout(grace, handle).await.is_err() {
            tracing::warn!("Broadcast loop did not stop within {:?}", grace);
        }
    }

    tracing::info!("livepath shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
