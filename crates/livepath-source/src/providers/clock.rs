//! Wall-clock producer.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};

use livepath_core::result::AppResult;
use livepath_core::traits::producer::Producer;

/// Returns `{"timestamp": <epoch millis>}`.
#[derive(Debug, Clone, Default)]
pub struct ClockProducer;

#[async_trait]
impl Producer for ClockProducer {
    fn kind(&self) -> &'static str {
        "clock"
    }

    async fn produce(&self) -> AppResult<Value> {
        Ok(json!({ "timestamp": Utc::now().timestamp_millis() }))
    }
}
