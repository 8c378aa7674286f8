//! Realtime engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    /// Connections ever established
    connections_total: AtomicU64,
    /// Connections currently open
    connections_active: AtomicU64,
    /// Messages received from clients
    messages_received: AtomicU64,
    /// Messages queued to clients
    messages_sent: AtomicU64,
    /// Messages dropped on full buffers
    messages_dropped: AtomicU64,
}

impl RealtimeMetrics {
    /// Create zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// A connection opened
    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// A connection closed
    pub fn connection_closed(&self) {
        let _ = self
            .connections_active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    /// A client message arrived
    pub fn message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// `n` messages were queued
    pub fn messages_sent(&self, n: u64) {
        self.messages_sent.fetch_add(n, Ordering::Relaxed);
    }

    /// `n` messages were dropped
    pub fn messages_dropped(&self, n: u64) {
        self.messages_dropped.fetch_add(n, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> RealtimeMetricsSnapshot {
        RealtimeMetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealtimeMetricsSnapshot {
    /// Connections ever established
    pub connections_total: u64,
    /// Connections currently open
    pub connections_active: u64,
    /// Messages received
    pub messages_received: u64,
    /// Messages queued
    pub messages_sent: u64,
    /// Messages dropped
    pub messages_dropped: u64,
}
