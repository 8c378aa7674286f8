//! Refresher counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Counters updated by every resolution.
#[derive(Debug, Default)]
pub struct RefreshStats {
    /// Cache-first resolutions answered from the cache
    pub hits: AtomicU64,
    /// Cache-first resolutions that had to recompute
    pub misses: AtomicU64,
    /// Producer invocations
    pub invocations: AtomicU64,
    /// Producer invocations that failed or timed out
    pub failures: AtomicU64,
    /// Callers that waited on another caller's recomputation
    pub coalesced: AtomicU64,
    /// Results not written because a newer one was already committed
    pub superseded: AtomicU64,
}

impl RefreshStats {
    pub(crate) fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters
    pub fn snapshot(&self) -> RefreshStatsSnapshot {
        RefreshStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invocations: self.invocations.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
        }
    }
}

/// Serializable counters snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshStatsSnapshot {
    /// Cache hits
    pub hits: u64,
    /// Cache misses
    pub misses: u64,
    /// Producer invocations
    pub invocations: u64,
    /// Failed invocations
    pub failures: u64,
    /// Coalesced waits
    pub coalesced: u64,
    /// Superseded results
    pub superseded: u64,
}
