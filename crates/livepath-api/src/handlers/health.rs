//! Health check handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

/// GET /api/health/detailed
pub async fn health_detailed(
    State(state): State<AppState>,
) -> Json<ApiResponse<DetailedHealthResponse>> {
    let cache_ok = matches!(state.services.cache.health_check().await, Ok(true));

    Json(ApiResponse::ok(DetailedHealthResponse {
        status: if cache_ok { "ok" } else { "degraded" }.to_string(),
        cache_provider: state.config.cache.provider.clone(),
        cache: if cache_ok { "connected" } else { "unavailable" }.to_string(),
        paths: state.services.registry.len(),
        ws_connections: state.realtime.connections.connection_count(),
        active_topics: state.realtime.channels.topic_count(),
        refresh: state.services.refresher.stats(),
        realtime: state.realtime.metrics.snapshot(),
    }))
}
