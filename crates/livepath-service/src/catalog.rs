//! Builds the path registry from configuration.

use std::sync::Arc;

use tracing::info;

use livepath_core::config::{PathConfig, SourceConfig};
use livepath_core::error::AppError;
use livepath_core::result::AppResult;
use livepath_core::traits::producer::Producer;
use livepath_source::UpstreamClients;
use livepath_source::providers::{
    ClockProducer, ComposedProducer, GraphiteProducer, PrometheusProducer, StaticProducer,
};

use crate::registry::PathRegistry;

/// Register every configured path, in order.
///
/// Fails on the first invalid or duplicate name, on a Graphite or
/// Prometheus path without a configured upstream, and on a composed path
/// referring to a part not registered before it.
pub fn build_registry(paths: &[PathConfig], upstream: &UpstreamClients) -> AppResult<PathRegistry> {
    let mut registry = PathRegistry::new();

    for path in paths {
        let producer = build_producer(&path.name, &path.source, upstream, &registry)?;
        registry.register(&path.name, producer, &path.description)?;
    }

    info!(paths = registry.len(), "Path registry built");
    Ok(registry)
}

fn build_producer(
    name: &str,
    source: &SourceConfig,
    upstream: &UpstreamClients,
    registry: &PathRegistry,
) -> AppResult<Arc<dyn Producer>> {
    let producer: Arc<dyn Producer> = match source {
        SourceConfig::Static { value } => Arc::new(StaticProducer::new(value.clone())),
        SourceConfig::Clock => Arc::new(ClockProducer),
        SourceConfig::Graphite { target, options } => {
            let client = upstream.graphite.clone().ok_or_else(|| {
                AppError::configuration(format!(
                    "Path '{name}' uses Graphite but upstream.graphite_url is not set"
                ))
            })?;
            Arc::new(GraphiteProducer::new(client, target.clone(), options.clone()))
        }
        SourceConfig::Prometheus { query, label } => {
            let client = upstream.prometheus.clone().ok_or_else(|| {
                AppError::configuration(format!(
                    "Path '{name}' uses Prometheus but upstream.prometheus_url is not set"
                ))
            })?;
            Arc::new(PrometheusProducer::new(client, query.clone(), label.clone()))
        }
        SourceConfig::Composed { parts } => {
            if parts.is_empty() {
                return Err(AppError::configuration(format!(
                    "Composed path '{name}' has no parts"
                )));
            }
            let parts = parts
                .iter()
                .map(|part| {
                    registry
                        .lookup(part)
                        .map(|entry| (part.clone(), Arc::clone(&entry.producer)))
                        .map_err(|_| {
                            AppError::configuration(format!(
                                "Composed path '{name}' refers to unknown part '{part}'"
                            ))
                        })
                })
                .collect::<AppResult<Vec<_>>>()?;
            Arc::new(ComposedProducer::new(parts))
        }
    };

    Ok(producer)
}
