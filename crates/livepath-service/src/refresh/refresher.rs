//! The refresh engine.
//!
//! [`Refresher::resolve`] answers a path either from the cache or by
//! invoking the path's producer and writing the result back.
//!
//! Two rules keep concurrent recomputations from clobbering each other:
//!
//! - Cache-first misses for the same path share one producer invocation.
//!   Forced refreshes always invoke the producer themselves.
//! - Every invocation draws a ticket before it starts. Its result is written
//!   to the cache only if no invocation with a later ticket has already
//!   committed, so a slow producer call never replaces a fresher value.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use livepath_core::config::{BroadcastConfig, CacheConfig};
use livepath_core::error::{AppError, ErrorKind};
use livepath_core::result::AppResult;
use livepath_core::traits::cache::CacheProvider;
use livepath_core::types::payload::Payload;

use super::stats::{RefreshStats, RefreshStatsSnapshot};
use crate::registry::{PathEntry, PathRegistry};

type SharedRefresh = Shared<BoxFuture<'static, AppResult<Payload>>>;

/// Tunables for the refresher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSettings {
    /// Lifetime of a written cache entry.
    pub ttl: Duration,
    /// Upper bound on a single producer invocation. `None` waits forever.
    pub producer_timeout: Option<Duration>,
}

impl RefreshSettings {
    /// Build settings from the cache and broadcast sections.
    pub fn from_config(cache: &CacheConfig, broadcast: &BroadcastConfig) -> Self {
        Self {
            ttl: cache.ttl(),
            producer_timeout: broadcast.producer_timeout(),
        }
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default(), &BroadcastConfig::default())
    }
}

struct RefresherInner {
    registry: Arc<PathRegistry>,
    cache: Arc<dyn CacheProvider>,
    settings: RefreshSettings,
    /// Cache-first recomputations currently running, by path.
    in_flight: DashMap<String, SharedRefresh>,
    /// Latest committed ticket, by path. The lock is held across the cache
    /// write so commits for one path are serialized.
    commits: DashMap<String, Arc<Mutex<u64>>>,
    next_ticket: AtomicU64,
    stats: RefreshStats,
}

/// Resolves path values against the cache and the path registry.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Refresher {
    inner: Arc<RefresherInner>,
}

impl fmt::Debug for Refresher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refresher")
            .field("paths", &self.inner.registry.len())
            .field("settings", &self.inner.settings)
            .field("in_flight", &self.inner.in_flight.len())
            .finish()
    }
}

impl Refresher {
    /// Create a refresher over `registry` and `cache`.
    pub fn new(
        registry: Arc<PathRegistry>,
        cache: Arc<dyn CacheProvider>,
        settings: RefreshSettings,
    ) -> Self {
        Self {
            inner: Arc::new(RefresherInner {
                registry,
                cache,
                settings,
                in_flight: DashMap::new(),
                commits: DashMap::new(),
                next_ticket: AtomicU64::new(0),
                stats: RefreshStats::default(),
            }),
        }
    }

    /// Resolve the current value of `name`.
    ///
    /// With `force_refresh` unset a live cache entry is returned without
    /// invoking the producer. Otherwise the producer runs and its result is
    /// written back to the cache. A failing producer leaves the cache as it
    /// was.
    pub async fn resolve(&self, name: &str, force_refresh: bool) -> AppResult<Payload> {
        let entry = self.inner.registry.lookup(name)?;

        if force_refresh {
            return self.inner.recompute(entry).await;
        }

        match self.inner.cache.get(name).await {
            Ok(Some(cached)) => {
                RefreshStats::inc(&self.inner.stats.hits);
                return Ok(Payload::from(cached));
            }
            Ok(None) => {}
            Err(e) => warn!(path = %name, error = %e, "Cache read failed, recomputing"),
        }

        RefreshStats::inc(&self.inner.stats.misses);
        self.coalesced_recompute(entry).await
    }

    /// Join a running cache-first recomputation of this path, or start one.
    async fn coalesced_recompute(&self, entry: Arc<PathEntry>) -> AppResult<Payload> {
        let shared = match self.inner.in_flight.entry(entry.name.clone()) {
            Entry::Occupied(slot) => {
                RefreshStats::inc(&self.inner.stats.coalesced);
                debug!(path = %entry.name, "Joining in-flight recomputation");
                slot.get().clone()
            }
            Entry::Vacant(slot) => {
                // The recomputation runs on its own task so it finishes, and
                // leaves `in_flight`, even when every waiter is dropped.
                let inner = Arc::clone(&self.inner);
                let name = entry.name.clone();
                let task = tokio::spawn(async move {
                    let _guard = InFlightGuard {
                        inner: Arc::clone(&inner),
                        name,
                    };
                    inner.recompute(entry).await
                });
                let refresh = async move {
                    task.await.unwrap_or_else(|e| {
                        Err(AppError::internal(format!("Refresh task failed: {e}")))
                    })
                }
                .boxed()
                .shared();
                slot.insert(refresh.clone());
                refresh
            }
        };

        shared.await
    }

    /// The registry this refresher resolves against.
    pub fn registry(&self) -> &Arc<PathRegistry> {
        &self.inner.registry
    }

    /// The cache backing this refresher.
    pub fn cache(&self) -> &Arc<dyn CacheProvider> {
        &self.inner.cache
    }

    /// Active settings.
    pub fn settings(&self) -> RefreshSettings {
        self.inner.settings
    }

    /// Snapshot of the resolution counters.
    pub fn stats(&self) -> RefreshStatsSnapshot {
        self.inner.stats.snapshot()
    }
}

/// Clears a path's `in_flight` slot when its recomputation task ends,
/// including by panic.
struct InFlightGuard {
    inner: Arc<RefresherInner>,
    name: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.inner.in_flight.remove(&self.name);
    }
}

impl RefresherInner {
    /// Invoke the producer and commit its result.
    async fn recompute(&self, entry: Arc<PathEntry>) -> AppResult<Payload> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed) + 1;
        RefreshStats::inc(&self.stats.invocations);
        let started = Instant::now();

        let produced = match self.settings.producer_timeout {
            Some(limit) => tokio::time::timeout(limit, entry.producer.produce())
                .await
                .unwrap_or_else(|_| Err(AppError::timeout(&entry.name, limit))),
            None => entry.producer.produce().await,
        };

        let value = match produced {
            Ok(value) => value,
            Err(e) => {
                RefreshStats::inc(&self.stats.failures);
                let err = match e.kind {
                    ErrorKind::Timeout => e,
                    _ => AppError::producer(&entry.name, &e),
                };
                warn!(path = %entry.name, error = %err, "Producer failed");
                return Err(err);
            }
        };

        let payload = Payload::from(serde_json::to_string(&value)?);

        debug!(
            path = %entry.name,
            ticket,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Recomputed path"
        );

        self.commit(&entry.name, ticket, &payload).await;
        Ok(payload)
    }

    /// Write `payload` to the cache unless a later ticket already committed.
    async fn commit(&self, name: &str, ticket: u64, payload: &str) {
        let slot = Arc::clone(self.commits.entry(name.to_string()).or_default().value());
        let mut committed = slot.lock().await;

        if ticket < *committed {
            RefreshStats::inc(&self.stats.superseded);
            debug!(path = %name, ticket, committed = *committed, "Discarding superseded result");
            return;
        }

        match self.cache.set(name, payload, self.settings.ttl).await {
            Ok(()) => *committed = ticket,
            Err(e) => warn!(path = %name, error = %e, "Cache write failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize};

    use async_trait::async_trait;
    use livepath_cache::memory::MemoryCacheProvider;
    use livepath_core::config::cache::MemoryCacheConfig;
    use livepath_core::traits::producer::Producer;
    use serde_json::{Value, json};

    /// Producer returning `{"n": <call number>}` (or a fixed value), with an
    /// optional per-call delay.
    #[derive(Debug, Default)]
    struct TestProducer {
        calls: AtomicUsize,
        delays: Vec<Duration>,
        fixed: Option<Value>,
        fail: AtomicBool,
    }

    impl TestProducer {
        fn with_delays(delays: &[u64]) -> Self {
            Self {
                delays: delays.iter().map(|ms| Duration::from_millis(*ms)).collect(),
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Producer for TestProducer {
        fn kind(&self) -> &'static str {
            "test"
        }

        async fn produce(&self) -> AppResult<Value> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(delay) = self.delays.get(n - 1) {
                tokio::time::sleep(*delay).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::external_service("upstream down"));
            }
            Ok(self.fixed.clone().unwrap_or_else(|| json!({ "n": n })))
        }
    }

    /// Cache whose every operation fails.
    #[derive(Debug)]
    struct BrokenCache;

    #[async_trait]
    impl CacheProvider for BrokenCache {
        async fn get(&self, _key: &str) -> AppResult<Option<String>> {
            Err(AppError::cache("connection refused"))
        }
        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
            Err(AppError::cache("connection refused"))
        }
        async fn invalidate(&self, _key: &str) -> AppResult<()> {
            Err(AppError::cache("connection refused"))
        }
        async fn health_check(&self) -> AppResult<bool> {
            Ok(false)
        }
        async fn flush_all(&self) -> AppResult<()> {
            Ok(())
        }
    }

    fn settings(ttl_secs: u64, timeout_ms: Option<u64>) -> RefreshSettings {
        RefreshSettings {
            ttl: Duration::from_secs(ttl_secs),
            producer_timeout: timeout_ms.map(Duration::from_millis),
        }
    }

    fn setup(
        producer: Arc<TestProducer>,
        settings: RefreshSettings,
    ) -> (Refresher, Arc<MemoryCacheProvider>) {
        let mut registry = PathRegistry::new();
        registry.register("p", producer, "test path").unwrap();

        let cache = Arc::new(MemoryCacheProvider::new(&MemoryCacheConfig::default()));
        let refresher = Refresher::new(Arc::new(registry), cache.clone(), settings);
        (refresher, cache)
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_load_served_from_cache() {
        let producer = Arc::new(TestProducer {
            fixed: Some(json!({"value": 42})),
            ..TestProducer::default()
        });
        let mut registry = PathRegistry::new();
        registry
            .register("server.load", producer.clone(), "Server load")
            .unwrap();
        let cache = Arc::new(MemoryCacheProvider::new(&MemoryCacheConfig::default()));
        let refresher = Refresher::new(Arc::new(registry), cache, settings(60, None));

        let first = refresher.resolve("server.load", false).await.unwrap();
        assert_eq!(&*first, r#"{"value":42}"#);
        assert_eq!(producer.calls(), 1);

        tokio::time::advance(Duration::from_millis(900)).await;
        let second = refresher.resolve("server.load", false).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(producer.calls(), 1);

        let stats = refresher.stats();
        assert_eq!((stats.hits, stats.misses, stats.invocations), (1, 1, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_refresh_always_invokes_and_overwrites() {
        let producer = Arc::new(TestProducer::default());
        let (refresher, _cache) = setup(producer.clone(), settings(60, None));

        assert_eq!(&*refresher.resolve("p", false).await.unwrap(), r#"{"n":1}"#);
        assert_eq!(&*refresher.resolve("p", true).await.unwrap(), r#"{"n":2}"#);
        assert_eq!(&*refresher.resolve("p", true).await.unwrap(), r#"{"n":3}"#);
        assert_eq!(producer.calls(), 3);

        // The forced result replaced the cached one.
        assert_eq!(&*refresher.resolve("p", false).await.unwrap(), r#"{"n":3}"#);
        assert_eq!(producer.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_recomputes() {
        let producer = Arc::new(TestProducer::default());
        let (refresher, _cache) = setup(producer.clone(), settings(1, None));

        refresher.resolve("p", false).await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;
        let value = refresher.resolve("p", false).await.unwrap();

        assert_eq!(&*value, r#"{"n":2}"#);
        assert_eq!(producer.calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_path_leaves_cache_untouched() {
        let producer = Arc::new(TestProducer::default());
        let (refresher, cache) = setup(producer.clone(), settings(60, None));

        for force in [false, true] {
            let err = refresher.resolve("missing.path", force).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::NotFound);
        }
        assert!(cache.is_empty());
        assert_eq!(producer.calls(), 0);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_value() {
        let producer = Arc::new(TestProducer::default());
        let (refresher, cache) = setup(producer.clone(), settings(60, None));

        refresher.resolve("p", false).await.unwrap();
        producer.fail.store(true, Ordering::SeqCst);

        let err = refresher.resolve("p", true).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Producer);
        assert!(err.message.contains("'p'"));

        assert_eq!(cache.get("p").await.unwrap().as_deref(), Some(r#"{"n":1}"#));
        assert_eq!(&*refresher.resolve("p", false).await.unwrap(), r#"{"n":1}"#);
        assert_eq!(refresher.stats().failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_producer_timeout() {
        let producer = Arc::new(TestProducer::with_delays(&[10_000]));
        let (refresher, cache) = setup(producer.clone(), settings(60, Some(1_000)));

        let err = refresher.resolve("p", true).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_misses_share_one_invocation() {
        let producer = Arc::new(TestProducer::with_delays(&[100]));
        let (refresher, _cache) = setup(producer.clone(), settings(60, None));

        let (a, b) = tokio::join!(refresher.resolve("p", false), refresher.resolve("p", false));

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(producer.calls(), 1);
        assert_eq!(refresher.stats().coalesced, 1);
        assert!(refresher.inner.in_flight.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_waiter_does_not_park_recomputation() {
        let producer = Arc::new(TestProducer::with_delays(&[100]));
        let (refresher, cache) = setup(producer.clone(), settings(60, None));

        let abandoned =
            tokio::time::timeout(Duration::from_millis(50), refresher.resolve("p", false)).await;
        assert!(abandoned.is_err());

        // The recomputation completes without anyone waiting on it.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(refresher.inner.in_flight.is_empty());
        assert_eq!(cache.get("p").await.unwrap().as_deref(), Some(r#"{"n":1}"#));

        // Long after, a new miss recomputes instead of joining a stale call.
        tokio::time::sleep(Duration::from_secs(120)).await;
        let value = refresher.resolve("p", false).await.unwrap();
        assert_eq!(&*value, r#"{"n":2}"#);
        assert_eq!(producer.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_holds_after_first_waiter_dropped() {
        let producer = Arc::new(TestProducer::with_delays(&[2_000]));
        let (refresher, cache) = setup(producer.clone(), settings(60, Some(1_000)));

        let abandoned =
            tokio::time::timeout(Duration::from_millis(50), refresher.resolve("p", false)).await;
        assert!(abandoned.is_err());

        let started = Instant::now();
        let err = refresher.resolve("p", false).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(producer.calls(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_forced_refreshes_are_not_coalesced() {
        let producer = Arc::new(TestProducer::with_delays(&[100, 100]));
        let (refresher, _cache) = setup(producer.clone(), settings(60, None));

        let (a, b) = tokio::join!(refresher.resolve("p", true), refresher.resolve("p", true));

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(producer.calls(), 2);
        assert_eq!(refresher.stats().coalesced, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_result_does_not_supplant_newer() {
        // First invocation is slow, second is fast and commits first.
        let producer = Arc::new(TestProducer::with_delays(&[200, 10]));
        let (refresher, cache) = setup(producer.clone(), settings(60, None));

        let (slow, fast) = tokio::join!(refresher.resolve("p", true), refresher.resolve("p", true));

        assert_eq!(&*slow.unwrap(), r#"{"n":1}"#);
        assert_eq!(&*fast.unwrap(), r#"{"n":2}"#);
        assert_eq!(cache.get("p").await.unwrap().as_deref(), Some(r#"{"n":2}"#));
        assert_eq!(refresher.stats().superseded, 1);
    }

    #[tokio::test]
    async fn test_broken_cache_still_serves_values() {
        let producer = Arc::new(TestProducer::default());
        let mut registry = PathRegistry::new();
        registry.register("p", producer.clone(), "").unwrap();
        let refresher = Refresher::new(
            Arc::new(registry),
            Arc::new(BrokenCache),
            settings(60, None),
        );

        assert_eq!(&*refresher.resolve("p", false).await.unwrap(), r#"{"n":1}"#);
        assert_eq!(&*refresher.resolve("p", false).await.unwrap(), r#"{"n":2}"#);
        assert_eq!(refresher.stats().hits, 0);
    }
}
