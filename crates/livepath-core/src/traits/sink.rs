//! Output sink trait consumed by the broadcast loop.

use async_trait::async_trait;

use crate::types::payload::Payload;

/// Delivers a broadcast value to every subscriber of a topic.
///
/// One call per topic per tick; fanning out to the individual subscribers
/// is the sink's job. Delivery is fire-and-forget: implementations log
/// their own failures instead of returning them.
#[async_trait]
pub trait OutputSink: Send + Sync + 'static {
    /// Deliver `payload` to the subscribers of `topic`.
    async fn deliver(&self, topic: &str, payload: Payload);
}
