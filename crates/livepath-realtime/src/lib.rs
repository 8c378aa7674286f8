//! # livepath-realtime
//!
//! Real-time side of livepath:
//!
//! - [`SubscriptionTable`]: which connections follow which topics
//! - [`ConnectionManager`]: WebSocket connection lifecycle and the
//!   subscribe/unsubscribe protocol
//! - [`SocketSink`]: the broadcast output sink, one delivery per topic
//!   fanned out to every subscribed socket

pub mod channel;
pub mod connection;
pub mod message;
pub mod metrics;
pub mod server;
pub mod sink;

pub use channel::table::SubscriptionTable;
pub use connection::manager::ConnectionManager;
pub use server::RealtimeEngine;
pub use sink::SocketSink;
