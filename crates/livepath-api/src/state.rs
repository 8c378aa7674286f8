//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use livepath_core::config::AppConfig;
use livepath_realtime::server::RealtimeEngine;
use livepath_service::context::ServiceContext;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Path registry, cache, and refresher
    pub services: ServiceContext,
    /// WebSocket realtime engine
    pub realtime: RealtimeEngine,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Bundle the shared dependencies.
    pub fn new(config: Arc<AppConfig>, services: ServiceContext, realtime: RealtimeEngine) -> Self {
        Self {
            config,
            services,
            realtime,
            started_at: Instant::now(),
        }
    }
}
