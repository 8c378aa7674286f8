//! Subscriber set of a single topic.

use std::collections::HashSet;

use crate::connection::handle::ConnectionId;

/// A topic and the connections subscribed to it.
#[derive(Debug, Clone)]
pub struct Channel {
    /// Topic (path) name.
    pub name: String,
    /// Subscribed connection IDs.
    subscribers: HashSet<ConnectionId>,
}

impl Channel {
    /// Creates a channel with no subscribers.
    pub fn new(name: String) -> Self {
        Self {
            name,
            subscribers: HashSet::new(),
        }
    }

    /// Adds a subscriber. Returns `false` if it was already subscribed.
    pub fn join(&mut self, conn_id: ConnectionId) -> bool {
        self.subscribers.insert(conn_id)
    }

    /// Removes a subscriber. Returns `false` if it was not subscribed.
    pub fn leave(&mut self, conn_id: ConnectionId) -> bool {
        self.subscribers.remove(&conn_id)
    }

    /// Number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Snapshot of the subscriber IDs.
    pub fn subscribers(&self) -> Vec<ConnectionId> {
        self.subscribers.iter().copied().collect()
    }
}
