//! Broadcast output sink backed by WebSocket connections.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::value::RawValue;
use tracing::{debug, error};

use livepath_core::traits::sink::OutputSink;
use livepath_core::types::payload::Payload;

use crate::connection::manager::ConnectionManager;
use crate::message::types::OutboundMessage;

/// Wraps each payload in an `update` message and queues it for every
/// socket subscribed to the topic.
#[derive(Debug, Clone)]
pub struct SocketSink {
    connections: Arc<ConnectionManager>,
}

impl SocketSink {
    /// Create a sink over `connections`.
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }
}

#[async_trait]
impl OutputSink for SocketSink {
    async fn deliver(&self, topic: &str, payload: Payload) {
        let data = match RawValue::from_string(payload.to_string()) {
            Ok(data) => data,
            Err(e) => {
                error!(topic = %topic, error = %e, "Payload is not valid JSON");
                return;
            }
        };

        let update = OutboundMessage::Update {
            channel: topic.to_string(),
            data,
        };
        let text = match update.to_text() {
            Ok(text) => Arc::<str>::from(text),
            Err(e) => {
                error!(topic = %topic, error = %e, "Failed to serialize update");
                return;
            }
        };

        let sent = self.connections.broadcast_to_channel(topic, text);
        debug!(topic = %topic, sent, "Update delivered");
    }
}
