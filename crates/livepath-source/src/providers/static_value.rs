//! Fixed-value producer.

use async_trait::async_trait;
use serde_json::Value;

use livepath_core::result::AppResult;
use livepath_core::traits::producer::Producer;

/// Returns the same JSON value on every invocation.
#[derive(Debug, Clone)]
pub struct StaticProducer {
    value: Value,
}

impl StaticProducer {
    /// Create a producer for `value`.
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

#[async_trait]
impl Producer for StaticProducer {
    fn kind(&self) -> &'static str {
        "static"
    }

    async fn produce(&self) -> AppResult<Value> {
        Ok(self.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_configured_value() {
        let producer = StaticProducer::new(serde_json::json!({"value": 42}));
        assert_eq!(producer.produce().await.unwrap()["value"], 42);
        assert_eq!(producer.produce().await.unwrap()["value"], 42);
    }
}
