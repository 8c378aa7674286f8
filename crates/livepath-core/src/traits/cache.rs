//! Cache provider trait for pluggable caching backends.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for cache backends (in-memory or Redis).
///
/// Values are serialized JSON strings. A value and its expiry are always
/// written together; an entry whose expiry has passed is never returned.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Store a value that expires `ttl` from now, replacing any prior entry.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Remove an entry immediately.
    async fn invalidate(&self, key: &str) -> AppResult<()>;

    /// Check that the cache backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Flush all entries from the cache.
    async fn flush_all(&self) -> AppResult<()>;
}
