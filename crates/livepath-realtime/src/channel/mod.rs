//! Topic subscriptions.

pub mod channel;
pub mod subscription;
pub mod table;

pub use table::SubscriptionTable;
