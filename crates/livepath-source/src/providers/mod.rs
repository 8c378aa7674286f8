//! Producer implementations.

pub mod clock;
pub mod composed;
pub mod graphite;
pub mod prometheus;
pub mod static_value;

pub use clock::ClockProducer;
pub use composed::ComposedProducer;
pub use graphite::GraphiteProducer;
pub use prometheus::PrometheusProducer;
pub use static_value::StaticProducer;
