//! Graphite render API producer.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use livepath_core::error::{AppError, ErrorKind};
use livepath_core::result::AppResult;
use livepath_core::traits::producer::Producer;

use crate::http::{endpoint, map_reqwest};

/// Client for Graphite's `/render` endpoint.
#[derive(Debug, Clone)]
pub struct GraphiteClient {
    http: reqwest::Client,
    base_url: String,
}

impl GraphiteClient {
    /// Create a client against `base_url`, e.g. `http://graphite:9000`.
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }

    /// Build the render URL for `target`. Extra `options` are appended as
    /// query pairs after `target` and `format`.
    pub fn render_url(&self, target: &str, options: &BTreeMap<String, String>) -> AppResult<Url> {
        let params = [("target", target), ("format", "json")]
            .into_iter()
            .chain(options.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        Url::parse_with_params(&endpoint(&self.base_url, "render"), params).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid Graphite URL '{}'", self.base_url),
                e,
            )
        })
    }

    /// Run a render query and return the decoded series list.
    pub async fn query(&self, target: &str, options: &BTreeMap<String, String>) -> AppResult<Value> {
        let url = self.render_url(target, options)?;
        debug!(url = %url, "Querying Graphite");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| map_reqwest("Graphite", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external_service(format!(
                "Graphite returned HTTP {status} for target '{target}'"
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| map_reqwest("Graphite", e))
    }
}

/// Produces the render output of one Graphite target.
#[derive(Debug, Clone)]
pub struct GraphiteProducer {
    client: GraphiteClient,
    target: String,
    options: BTreeMap<String, String>,
}

impl GraphiteProducer {
    /// Create a producer for `target` with extra render options.
    pub fn new(client: GraphiteClient, target: String, options: BTreeMap<String, String>) -> Self {
        Self {
            client,
            target,
            options,
        }
    }
}

#[async_trait]
impl Producer for GraphiteProducer {
    fn kind(&self) -> &'static str {
        "graphite"
    }

    async fn produce(&self) -> AppResult<Value> {
        self.client.query(&self.target, &self.options).await
    }
}
