//! Connection manager: connection lifecycle and the subscribe protocol.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use livepath_core::config::RealtimeConfig;
use livepath_core::types::path::path_from_url;
use livepath_service::registry::PathRegistry;

use crate::channel::table::SubscriptionTable;
use crate::message::types::{InboundMessage, OutboundMessage};
use crate::metrics::RealtimeMetrics;

use super::handle::{ConnectionHandle, ConnectionId, SendOutcome};
use super::pool::ConnectionPool;

/// Manages all active WebSocket connections.
///
/// Membership changes made on behalf of clients are reported into the
/// shared [`SubscriptionTable`]; a disconnect removes every membership of
/// that connection.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Connection pool.
    pool: ConnectionPool,
    /// Topic memberships.
    channels: Arc<SubscriptionTable>,
    /// Paths clients may subscribe to.
    registry: Arc<PathRegistry>,
    /// Metrics.
    metrics: Arc<RealtimeMetrics>,
    /// Configuration.
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        config: RealtimeConfig,
        channels: Arc<SubscriptionTable>,
        registry: Arc<PathRegistry>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            pool: ConnectionPool::new(),
            channels,
            registry,
            metrics,
            config,
        }
    }

    /// Registers a new connection.
    ///
    /// Returns the connection handle and a receiver for outbound message text.
    pub fn register(&self) -> (Arc<ConnectionHandle>, mpsc::Receiver<Arc<str>>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(tx));

        self.pool.add(handle.clone());
        self.metrics.connection_opened();

        info!(conn_id = %handle.id, "WebSocket connection registered");
        (handle, rx)
    }

    /// Unregisters a connection and drops all of its subscriptions.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        if let Some(handle) = self.pool.remove(conn_id) {
            handle.mark_dead();
            let left = self.channels.leave_all(*conn_id);
            self.metrics.connection_closed();

            info!(conn_id = %conn_id, topics_left = left, "WebSocket connection unregistered");
        }
    }

    /// Processes an inbound text message from a client.
    pub fn handle_inbound(&self, conn_id: &ConnectionId, raw_message: &str) {
        let Some(handle) = self.pool.get(conn_id) else {
            warn!(conn_id = %conn_id, "Message from unknown connection");
            return;
        };

        self.metrics.message_received();

        let msg: InboundMessage = match serde_json::from_str(raw_message) {
            Ok(m) => m,
            Err(e) => {
                self.reply(
                    &handle,
                    &OutboundMessage::error("INVALID_MESSAGE", format!("Failed to parse message: {e}")),
                );
                return;
            }
        };

        match msg {
            InboundMessage::Subscribe { channel } => self.handle_subscribe(&handle, &channel),
            InboundMessage::Unsubscribe { channel } => {
                let topic = path_from_url(&channel);
                self.channels.leave(&topic, handle.id);
                self.reply(&handle, &OutboundMessage::Unsubscribed { channel: topic });
            }
            InboundMessage::Ping => {
                self.reply(
                    &handle,
                    &OutboundMessage::Pong {
                        timestamp: Utc::now().timestamp_millis(),
                    },
                );
            }
        }
    }

    /// Handles a subscribe request.
    fn handle_subscribe(&self, handle: &ConnectionHandle, channel: &str) {
        let topic = path_from_url(channel);

        if !self.registry.contains(&topic) {
            self.reply(
                handle,
                &OutboundMessage::error("UNKNOWN_PATH", format!("Path not found: '{topic}'")),
            );
            return;
        }

        let current = self.channels.subscription_count(handle.id);
        if current >= self.config.max_subscriptions_per_connection {
            self.reply(
                handle,
                &OutboundMessage::error(
                    "MAX_SUBSCRIPTIONS",
                    format!(
                        "Maximum subscriptions ({}) reached",
                        self.config.max_subscriptions_per_connection
                    ),
                ),
            );
            return;
        }

        self.channels.join(&topic, handle.id);
        debug!(conn_id = %handle.id, topic = %topic, "Subscribed to topic");
        self.reply(handle, &OutboundMessage::Subscribed { channel: topic });
    }

    fn reply(&self, handle: &ConnectionHandle, message: &OutboundMessage) {
        match message.to_text() {
            Ok(text) => {
                if handle.send(Arc::from(text)) == SendOutcome::Queued {
                    self.metrics.messages_sent(1);
                }
            }
            Err(e) => error!(error = %e, "Failed to serialize outbound message"),
        }
    }

    /// Queues `text` for every subscriber of `topic`. Returns how many
    /// connections accepted it.
    pub fn broadcast_to_channel(&self, topic: &str, text: Arc<str>) -> usize {
        let mut sent = 0;
        let mut dropped = 0;

        for conn_id in self.channels.subscribers(topic) {
            let Some(handle) = self.pool.get(&conn_id) else {
                continue;
            };
            match handle.send(text.clone()) {
                SendOutcome::Queued => sent += 1,
                SendOutcome::Dropped => dropped += 1,
                SendOutcome::Closed => {
                    debug!(conn_id = %conn_id, "Skipping closed connection");
                }
            }
        }

        self.metrics.messages_sent(sent as u64);
        self.metrics.messages_dropped(dropped);
        sent
    }

    /// Closes all connections.
    pub fn close_all(&self) {
        let all = self.pool.all();
        for conn in &all {
            self.unregister(&conn.id);
        }
        info!(count = all.len(), "All connections closed");
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livepath_source::providers::StaticProducer;
    use serde_json::{Value, json};

    fn manager(max_subs: usize) -> (ConnectionManager, Arc<SubscriptionTable>) {
        let mut registry = PathRegistry::new();
        for name in ["server.load", "switch.interfaces"] {
            registry
                .register(name, Arc::new(StaticProducer::new(json!(1))), "")
                .unwrap();
        }
        let channels = Arc::new(SubscriptionTable::new());
        let config = RealtimeConfig {
            max_subscriptions_per_connection: max_subs,
            ..RealtimeConfig::default()
        };
        let manager = ConnectionManager::new(
            config,
            channels.clone(),
            Arc::new(registry),
            Arc::new(RealtimeMetrics::new()),
        );
        (manager, channels)
    }

    fn next(rx: &mut mpsc::Receiver<Arc<str>>) -> Value {
        serde_json::from_str(&rx.try_recv().unwrap()).unwrap()
    }

    #[test]
    fn test_subscribe_registered_path() {
        let (manager, channels) = manager(10);
        let (handle, mut rx) = manager.register();

        manager.handle_inbound(&handle.id, r#"{"type":"subscribe","channel":"Server/Load"}"#);

        assert_eq!(next(&mut rx), json!({"type": "subscribed", "channel": "server.load"}));
        assert_eq!(channels.subscribers("server.load"), vec![handle.id]);
    }

    #[test]
    fn test_subscribe_unknown_path_rejected() {
        let (manager, channels) = manager(10);
        let (handle, mut rx) = manager.register();

        manager.handle_inbound(&handle.id, r#"{"type":"subscribe","channel":"nope"}"#);

        let reply = next(&mut rx);
        assert_eq!(reply["type"], "error");
        assert_eq!(reply["code"], "UNKNOWN_PATH");
        assert!(channels.active_topics().is_empty());
    }

    #[test]
    fn test_subscription_limit() {
        let (manager, channels) = manager(1);
        let (handle, mut rx) = manager.register();

        manager.handle_inbound(&handle.id, r#"{"type":"subscribe","channel":"server.load"}"#);
        manager.handle_inbound(&handle.id, r#"{"type":"subscribe","channel":"switch.interfaces"}"#);

        assert_eq!(next(&mut rx)["type"], "subscribed");
        assert_eq!(next(&mut rx)["code"], "MAX_SUBSCRIPTIONS");
        assert_eq!(channels.topic_count(), 1);
    }

    #[test]
    fn test_invalid_message_and_ping() {
        let (manager, _) = manager(10);
        let (handle, mut rx) = manager.register();

        manager.handle_inbound(&handle.id, "not json");
        assert_eq!(next(&mut rx)["code"], "INVALID_MESSAGE");

        manager.handle_inbound(&handle.id, r#"{"type":"ping"}"#);
        let pong = next(&mut rx);
        assert_eq!(pong["type"], "pong");
        assert!(pong["timestamp"].is_i64());
    }

    #[test]
    fn test_unsubscribe_and_disconnect_clear_memberships() {
        let (manager, channels) = manager(10);
        let (a, mut rx_a) = manager.register();
        let (b, _rx_b) = manager.register();

        for id in [a.id, b.id] {
            manager.handle_inbound(&id, r#"{"type":"subscribe","channel":"server.load"}"#);
        }
        manager.handle_inbound(&a.id, r#"{"type":"subscribe","channel":"switch.interfaces"}"#);

        manager.handle_inbound(&a.id, r#"{"type":"unsubscribe","channel":"switch.interfaces"}"#);
        let _ = next(&mut rx_a);
        let _ = next(&mut rx_a);
        assert_eq!(next(&mut rx_a)["type"], "unsubscribed");
        assert_eq!(channels.active_topics(), vec!["server.load".to_string()]);

        manager.unregister(&b.id);
        assert_eq!(channels.subscribers("server.load"), vec![a.id]);
        manager.unregister(&a.id);
        assert!(channels.active_topics().is_empty());
        assert_eq!(manager.connection_count(), 0);
    }

    #[test]
    fn test_broadcast_reaches_every_subscriber() {
        let (manager, _) = manager(10);
        let (a, mut rx_a) = manager.register();
        let (b, mut rx_b) = manager.register();
        let (_c, mut rx_c) = manager.register();

        for id in [a.id, b.id] {
            manager.handle_inbound(&id, r#"{"type":"subscribe","channel":"server.load"}"#);
        }
        let _ = (next(&mut rx_a), next(&mut rx_b));

        let sent = manager.broadcast_to_channel("server.load", Arc::from("hello"));
        assert_eq!(sent, 2);
        assert_eq!(rx_a.try_recv().unwrap().as_ref(), "hello");
        assert_eq!(rx_b.try_recv().unwrap().as_ref(), "hello");
        assert!(rx_c.try_recv().is_err());
    }
}
