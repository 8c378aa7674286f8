//! Inbound and outbound WebSocket message type definitions.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Messages sent by the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Follow a path.
    Subscribe {
        /// Path name.
        channel: String,
    },
    /// Stop following a path.
    Unsubscribe {
        /// Path name.
        channel: String,
    },
    /// Application-level keepalive.
    Ping,
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Subscription confirmed.
    Subscribed {
        /// Path name.
        channel: String,
    },
    /// Unsubscription confirmed.
    Unsubscribed {
        /// Path name.
        channel: String,
    },
    /// Fresh value of a followed path.
    Update {
        /// Path name.
        channel: String,
        /// The path's serialized value, embedded verbatim.
        data: Box<RawValue>,
    },
    /// A request could not be honored.
    Error {
        /// Machine-readable code.
        code: String,
        /// Human-readable detail.
        message: String,
    },
    /// Reply to `ping`.
    Pong {
        /// Server time in epoch milliseconds.
        timestamp: i64,
    },
}

impl OutboundMessage {
    /// Build an error message.
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Serialize to the JSON text sent over the socket.
    pub fn to_text(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
