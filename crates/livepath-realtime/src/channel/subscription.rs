//! Reverse index from connections to the topics they follow.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::handle::ConnectionId;

/// Connection → subscribed topics. Used to clean up on disconnect and to
/// enforce the per-connection subscription limit.
#[derive(Debug, Default)]
pub struct SubscriptionTracker {
    conn_to_topics: DashMap<ConnectionId, HashSet<String>>,
}

impl SubscriptionTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a subscription.
    pub fn add(&self, conn_id: ConnectionId, topic: &str) {
        self.conn_to_topics
            .entry(conn_id)
            .or_default()
            .insert(topic.to_string());
    }

    /// Forgets a subscription.
    pub fn remove(&self, conn_id: ConnectionId, topic: &str) {
        if let Some(mut topics) = self.conn_to_topics.get_mut(&conn_id) {
            topics.remove(topic);
        }
        self.conn_to_topics
            .remove_if(&conn_id, |_, topics| topics.is_empty());
    }

    /// Number of topics a connection follows.
    pub fn count(&self, conn_id: ConnectionId) -> usize {
        self.conn_to_topics
            .get(&conn_id)
            .map(|entry| entry.len())
            .unwrap_or(0)
    }

    /// Forgets every subscription of a connection, returning them.
    pub fn remove_all(&self, conn_id: ConnectionId) -> HashSet<String> {
        self.conn_to_topics
            .remove(&conn_id)
            .map(|(_, topics)| topics)
            .unwrap_or_default()
    }
}
