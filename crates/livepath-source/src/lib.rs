//! # livepath-source
//!
//! Producer implementations that compute path values:
//!
//! - [`providers::StaticProducer`]: a fixed JSON value
//! - [`providers::ClockProducer`]: the current time
//! - [`providers::GraphiteProducer`]: a Graphite render query
//! - [`providers::PrometheusProducer`]: a Prometheus instant query
//! - [`providers::ComposedProducer`]: several producers merged into one object
//!
//! Upstream-backed producers share an [`http::UpstreamClients`] bundle built
//! once from configuration.

pub mod http;
pub mod providers;

pub use http::UpstreamClients;
