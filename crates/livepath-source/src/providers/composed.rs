//! Producer that merges several other producers into one object.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use serde_json::{Map, Value};

use livepath_core::error::AppError;
use livepath_core::result::AppResult;
use livepath_core::traits::producer::Producer;

/// Runs every part concurrently and returns `{<part name>: <part value>}`.
///
/// The first failing part fails the whole value.
#[derive(Debug, Clone)]
pub struct ComposedProducer {
    parts: Vec<(String, Arc<dyn Producer>)>,
}

impl ComposedProducer {
    /// Create a composed producer from named parts.
    pub fn new(parts: Vec<(String, Arc<dyn Producer>)>) -> Self {
        Self { parts }
    }
}

#[async_trait]
impl Producer for ComposedProducer {
    fn kind(&self) -> &'static str {
        "composed"
    }

    async fn produce(&self) -> AppResult<Value> {
        let futures = self.parts.iter().map(|(name, producer)| async move {
            producer
                .produce()
                .await
                .map(|value| (name.clone(), value))
                .map_err(|e| AppError::new(e.kind, format!("part '{name}': {}", e.message)))
        });

        let values = try_join_all(futures).await?;
        Ok(Value::Object(values.into_iter().collect::<Map<_, _>>()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::StaticProducer;
    use livepath_core::error::ErrorKind;
    use serde_json::json;

    #[derive(Debug)]
    struct Failing;

    #[async_trait]
    impl Producer for Failing {
        fn kind(&self) -> &'static str {
            "failing"
        }

        async fn produce(&self) -> AppResult<Value> {
            Err(AppError::external_service("upstream down"))
        }
    }

    #[tokio::test]
    async fn test_merges_parts_by_name() {
        let composed = ComposedProducer::new(vec![
            ("load".into(), Arc::new(StaticProducer::new(json!(1.5))) as Arc<dyn Producer>),
            ("users".into(), Arc::new(StaticProducer::new(json!([1, 2]))) as Arc<dyn Producer>),
        ]);

        let value = composed.produce().await.unwrap();
        assert_eq!(value, json!({"load": 1.5, "users": [1, 2]}));
    }

    #[tokio::test]
    async fn test_failing_part_fails_whole() {
        let composed = ComposedProducer::new(vec![
            ("ok".into(), Arc::new(StaticProducer::new(json!(1))) as Arc<dyn Producer>),
            ("bad".into(), Arc::new(Failing) as Arc<dyn Producer>),
        ]);

        let err = composed.produce().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExternalService);
        assert!(err.message.contains("part 'bad'"));
    }
}
