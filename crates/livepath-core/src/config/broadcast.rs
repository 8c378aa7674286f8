//! Periodic broadcast configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the loop that re-publishes subscribed paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    /// Whether the broadcast loop runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Tick interval in milliseconds.
    #[serde(default = "default_interval")]
    pub interval_ms: u64,
    /// Upper bound on a single producer invocation in milliseconds (0 = unbounded).
    #[serde(default = "default_producer_timeout")]
    pub producer_timeout_ms: u64,
}

impl BroadcastConfig {
    /// Returns the tick interval.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Returns the producer deadline, or `None` when unbounded.
    pub fn producer_timeout(&self) -> Option<Duration> {
        (self.producer_timeout_ms > 0).then(|| Duration::from_millis(self.producer_timeout_ms))
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: default_interval(),
            producer_timeout_ms: default_producer_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval() -> u64 {
    10_000
}

fn default_producer_timeout() -> u64 {
    5_000
}
