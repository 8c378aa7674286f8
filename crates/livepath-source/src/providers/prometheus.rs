//! Prometheus instant-query producer.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use livepath_core::error::{AppError, ErrorKind};
use livepath_core::result::AppResult;
use livepath_core::traits::producer::Producer;

use crate::http::{endpoint, map_reqwest};

/// Envelope returned by `/api/v1/query`.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    status: String,
    #[serde(default)]
    data: Option<QueryData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    #[serde(default)]
    result: Value,
}

/// Client for Prometheus' HTTP query API.
#[derive(Debug, Clone)]
pub struct PrometheusClient {
    http: reqwest::Client,
    base_url: String,
}

impl PrometheusClient {
    /// Create a client against `base_url`, e.g. `http://prometheus:9090`.
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }

    /// Build the instant-query URL for `query`.
    pub fn query_url(&self, query: &str) -> AppResult<Url> {
        Url::parse_with_params(&endpoint(&self.base_url, "api/v1/query"), [("query", query)])
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Invalid Prometheus URL '{}'", self.base_url),
                    e,
                )
            })
    }

    /// Run an instant query and return the `data.result` array.
    pub async fn query(&self, query: &str) -> AppResult<Value> {
        let url = self.query_url(query)?;
        debug!(url = %url, "Querying Prometheus");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| map_reqwest("Prometheus", e))?;

        // Prometheus answers 4xx with a JSON body carrying the error text.
        let status = response.status();
        let body: QueryResponse = response.json().await.map_err(|e| {
            if status.is_success() {
                map_reqwest("Prometheus", e)
            } else {
                AppError::external_service(format!("Prometheus returned HTTP {status}"))
            }
        })?;

        if body.status != "success" {
            return Err(AppError::external_service(format!(
                "Prometheus query failed: {}",
                body.error.as_deref().unwrap_or("unknown error")
            )));
        }

        Ok(body.data.map(|d| d.result).unwrap_or(Value::Array(Vec::new())))
    }
}

/// Reshape a vector result into `{<label value>: <sample value>}`.
///
/// Samples missing the label are skipped. Sample values are parsed as
/// numbers when possible and kept as strings otherwise.
pub fn reshape_by_label(result: &Value, label: &str) -> Value {
    let mut out = Map::new();

    for series in result.as_array().into_iter().flatten() {
        let Some(key) = series
            .get("metric")
            .and_then(|m| m.get(label))
            .and_then(Value::as_str)
        else {
            continue;
        };

        // `value` is `[<unix time>, "<sample>"]`.
        let sample = series
            .get("value")
            .and_then(|v| v.get(1))
            .cloned()
            .unwrap_or(Value::Null);

        let sample = match sample {
            Value::String(s) => s
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::String(s)),
            other => other,
        };

        out.insert(key.to_string(), sample);
    }

    Value::Object(out)
}

/// Produces the result of one PromQL query.
#[derive(Debug, Clone)]
pub struct PrometheusProducer {
    client: PrometheusClient,
    query: String,
    label: Option<String>,
}

impl PrometheusProducer {
    /// Create a producer. With a `label`, results are reshaped into a map
    /// keyed by that label.
    pub fn new(client: PrometheusClient, query: String, label: Option<String>) -> Self {
        Self {
            client,
            query,
            label,
        }
    }
}

#[async_trait]
impl Producer for PrometheusProducer {
    fn kind(&self) -> &'static str {
        "prometheus"
    }

    async fn produce(&self) -> AppResult<Value> {
        let result = self.client.query(&self.query).await?;
        Ok(match &self.label {
            Some(label) => reshape_by_label(&result, label),
            None => result,
        })
    }
}
