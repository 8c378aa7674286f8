//! The subscription table consulted by the broadcast loop.

use dashmap::DashMap;
use tracing::debug;

use crate::connection::handle::ConnectionId;

use super::channel::Channel;
use super::subscription::SubscriptionTracker;

/// Tracks which topics have at least one subscriber.
///
/// A topic exists in the table only while its subscriber set is non-empty:
/// the first `join` creates it and the last `leave` removes it. Emptiness is
/// re-checked under the shard lock before removal, so a `join` racing the
/// last `leave` is never lost.
#[derive(Debug, Default)]
pub struct SubscriptionTable {
    /// Topic → subscribers.
    channels: DashMap<String, Channel>,
    /// Connection → topics.
    tracker: SubscriptionTracker,
}

impl SubscriptionTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a connection to a topic. Returns `false` if it already was.
    pub fn join(&self, topic: &str, conn_id: ConnectionId) -> bool {
        let added = self
            .channels
            .entry(topic.to_string())
            .or_insert_with(|| Channel::new(topic.to_string()))
            .join(conn_id);

        if added {
            self.tracker.add(conn_id, topic);
            debug!(topic = %topic, conn_id = %conn_id, "Joined topic");
        }
        added
    }

    /// Unsubscribes a connection from a topic. Returns `false` if it was not
    /// subscribed.
    pub fn leave(&self, topic: &str, conn_id: ConnectionId) -> bool {
        let removed = self
            .channels
            .get_mut(topic)
            .map(|mut channel| channel.leave(conn_id))
            .unwrap_or(false);

        self.channels.remove_if(topic, |_, channel| channel.is_empty());
        self.tracker.remove(conn_id, topic);

        if removed {
            debug!(topic = %topic, conn_id = %conn_id, "Left topic");
        }
        removed
    }

    /// Unsubscribes a connection from every topic. Returns how many it left.
    pub fn leave_all(&self, conn_id: ConnectionId) -> usize {
        let topics = self.tracker.remove_all(conn_id);
        for topic in &topics {
            if let Some(mut channel) = self.channels.get_mut(topic) {
                channel.leave(conn_id);
            }
            self.channels.remove_if(topic, |_, channel| channel.is_empty());
        }
        topics.len()
    }

    /// Topics with at least one subscriber. Order is unspecified.
    pub fn active_topics(&self) -> Vec<String> {
        self.channels
            .iter()
            .filter(|entry| !entry.is_empty())
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Subscribers of a topic.
    pub fn subscribers(&self, topic: &str) -> Vec<ConnectionId> {
        self.channels
            .get(topic)
            .map(|channel| channel.subscribers())
            .unwrap_or_default()
    }

    /// Number of subscribers of a topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.channels
            .get(topic)
            .map(|channel| channel.subscriber_count())
            .unwrap_or(0)
    }

    /// Number of topics a connection follows.
    pub fn subscription_count(&self, conn_id: ConnectionId) -> usize {
        self.tracker.count(conn_id)
    }

    /// Number of active topics.
    pub fn topic_count(&self) -> usize {
        self.channels.len()
    }
}
