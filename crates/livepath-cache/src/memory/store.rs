//! In-memory cache implementation with per-entry expiry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use livepath_core::config::cache::MemoryCacheConfig;
use livepath_core::result::AppResult;
use livepath_core::traits::cache::CacheProvider;

/// A cached value together with the instant it stops being valid.
///
/// Value and expiry live in one struct so that a write replaces both at once.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// In-memory cache provider backed by a sharded concurrent map.
///
/// Expired entries are removed lazily when read. A write that takes the map
/// over capacity purges expired entries and then evicts the entries closest
/// to expiry.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// Key → entry.
    entries: Arc<DashMap<String, CacheEntry>>,
    /// Capacity bound.
    max_entries: usize,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            max_entries: config.max_entries.max(1),
        }
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(now));
        before.saturating_sub(self.entries.len())
    }

    /// Bring the map back within capacity without evicting `keep`.
    ///
    /// Runs after every insert, so each concurrent writer trims the overflow
    /// it may have caused.
    fn enforce_capacity(&self, keep: &str) {
        if self.entries.len() <= self.max_entries {
            return;
        }

        let purged = self.purge_expired();
        if purged > 0 {
            debug!(purged, "Purged expired entries to make room");
        }

        while self.entries.len() > self.max_entries {
            let victim = self
                .entries
                .iter()
                .filter(|entry| entry.key() != keep)
                .min_by_key(|entry| entry.value().expires_at)
                .map(|entry| entry.key().clone());

            let Some(key) = victim else { break };
            self.entries.remove(&key);
            debug!(key = %key, "Evicted entry closest to expiry");
        }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let now = Instant::now();

        match self.entries.get(key) {
            Some(entry) if entry.is_fresh(now) => return Ok(Some(entry.value.clone())),
            Some(_) => {}
            None => return Ok(None),
        }

        // A concurrent set may have replaced the stale entry in between.
        self.entries.remove_if(key, |_, entry| !entry.is_fresh(now));
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl).unwrap_or(now + Duration::from_secs(u32::MAX as u64));

        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at,
            },
        );
        self.enforce_capacity(key);
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn flush_all(&self) -> AppResult<()> {
        self.entries.clear();
        Ok(())
    }
}
