//! Top-level real-time engine that ties together the realtime subsystems.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use livepath_core::config::RealtimeConfig;
use livepath_service::registry::PathRegistry;

use crate::channel::table::SubscriptionTable;
use crate::connection::manager::ConnectionManager;
use crate::metrics::RealtimeMetrics;
use crate::sink::SocketSink;

/// Central real-time engine: subscriptions, connections, and metrics.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Topic subscriptions.
    pub channels: Arc<SubscriptionTable>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.connections.connection_count())
            .field("topics", &self.channels.topic_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates the engine. Clients may subscribe to paths in `registry`.
    pub fn new(config: RealtimeConfig, registry: Arc<PathRegistry>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let metrics = Arc::new(RealtimeMetrics::new());
        let channels = Arc::new(SubscriptionTable::new());
        let connections = Arc::new(ConnectionManager::new(
            config,
            channels.clone(),
            registry,
            metrics.clone(),
        ));

        info!("Real-time engine initialized");

        Self {
            connections,
            channels,
            metrics,
            shutdown_tx,
        }
    }

    /// Output sink delivering broadcast updates to subscribed sockets.
    pub fn sink(&self) -> SocketSink {
        SocketSink::new(self.connections.clone())
    }

    /// Returns a shutdown receiver for socket tasks.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signals socket tasks to stop and drops every connection.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");
        let _ = self.shutdown_tx.send(());
        self.connections.close_all();
    }
}
