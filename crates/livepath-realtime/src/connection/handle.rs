//! Individual WebSocket connection handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// Outcome of queueing a message for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Queued for the socket writer.
    Queued,
    /// Buffer full; message dropped.
    Dropped,
    /// Connection is gone.
    Closed,
}

/// A handle to a single WebSocket connection.
///
/// Outbound text is queued on a bounded channel drained by the socket
/// writer task; a slow client loses messages instead of stalling senders.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Sender for outbound message text
    sender: mpsc::Sender<Arc<str>>,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    /// Whether the connection is still alive
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle
    pub fn new(sender: mpsc::Sender<Arc<str>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// Queue message text without waiting
    pub fn send(&self, text: Arc<str>) -> SendOutcome {
        if !self.is_alive() {
            return SendOutcome::Closed;
        }
        match self.sender.try_send(text) {
            Ok(()) => SendOutcome::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %self.id, "Send buffer full, dropping message");
                SendOutcome::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                SendOutcome::Closed
            }
        }
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as dead
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_outcomes() {
        let (tx, mut rx) = mpsc::channel(1);
        let handle = ConnectionHandle::new(tx);

        assert_eq!(handle.send(Arc::from("a")), SendOutcome::Queued);
        assert_eq!(handle.send(Arc::from("b")), SendOutcome::Dropped);
        assert_eq!(rx.try_recv().unwrap().as_ref(), "a");

        drop(rx);
        assert_eq!(handle.send(Arc::from("c")), SendOutcome::Closed);
        assert!(!handle.is_alive());
    }
}
