//! Shared HTTP clients for upstream data sources.

use livepath_core::config::UpstreamConfig;
use livepath_core::error::{AppError, ErrorKind};
use livepath_core::result::AppResult;

use crate::providers::graphite::GraphiteClient;
use crate::providers::prometheus::PrometheusClient;

/// Clients for every configured upstream. Missing URLs leave the client unset.
#[derive(Debug, Clone, Default)]
pub struct UpstreamClients {
    /// Graphite render API client.
    pub graphite: Option<GraphiteClient>,
    /// Prometheus query API client.
    pub prometheus: Option<PrometheusClient>,
}

impl UpstreamClients {
    /// Build clients from configuration.
    pub fn from_config(config: &UpstreamConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("livepath/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            graphite: config
                .graphite_url
                .as_deref()
                .map(|url| GraphiteClient::new(http.clone(), url)),
            prometheus: config
                .prometheus_url
                .as_deref()
                .map(|url| PrometheusClient::new(http.clone(), url)),
        })
    }
}

/// Map a transport-level HTTP error.
pub(crate) fn map_reqwest(upstream: &str, err: reqwest::Error) -> AppError {
    let message = if err.is_timeout() {
        format!("{upstream} request timed out")
    } else if err.is_decode() {
        format!("{upstream} returned an undecodable body: {err}")
    } else {
        format!("{upstream} request failed: {err}")
    };
    AppError::with_source(ErrorKind::ExternalService, message, err)
}

/// Join a base URL and an endpoint path without doubling slashes.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
