//! Upstream data source endpoints.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where upstream-backed producers send their queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of a Graphite render API, e.g. `http://graphite:9000`.
    #[serde(default)]
    pub graphite_url: Option<String>,
    /// Base URL of a Prometheus server, e.g. `http://localhost:9090`.
    #[serde(default)]
    pub prometheus_url: Option<String>,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl UpstreamConfig {
    /// Returns the HTTP request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            graphite_url: None,
            prometheus_url: None,
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    10
}
