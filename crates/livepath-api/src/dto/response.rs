//! Response DTOs.

use serde::{Deserialize, Serialize};

use livepath_realtime::metrics::RealtimeMetricsSnapshot;
use livepath_service::refresh::RefreshStatsSnapshot;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Basic health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since startup.
    pub uptime_seconds: u64,
}

/// Detailed health check response.
#[derive(Debug, Clone, Serialize)]
pub struct DetailedHealthResponse {
    /// `ok`, or `degraded` when the cache is unreachable.
    pub status: String,
    /// Cache provider name.
    pub cache_provider: String,
    /// `connected` or `unavailable`.
    pub cache: String,
    /// Registered paths.
    pub paths: usize,
    /// Open WebSocket connections.
    pub ws_connections: usize,
    /// Topics with at least one subscriber.
    pub active_topics: usize,
    /// Refresher counters.
    pub refresh: RefreshStatsSnapshot,
    /// WebSocket counters.
    pub realtime: RealtimeMetricsSnapshot,
}
