//! Explicitly constructed service context.

use std::sync::Arc;

use livepath_core::config::AppConfig;
use livepath_core::result::AppResult;
use livepath_core::traits::cache::CacheProvider;
use livepath_source::UpstreamClients;

use crate::catalog::build_registry;
use crate::refresh::{RefreshSettings, Refresher};
use crate::registry::PathRegistry;

/// Owns the path registry, the cache handle, and the refresher built on them.
///
/// Constructed once at startup and handed to the transport and the
/// broadcast loop; tests build isolated instances.
#[derive(Debug, Clone)]
pub struct ServiceContext {
    /// Registered paths.
    pub registry: Arc<PathRegistry>,
    /// Cache backend.
    pub cache: Arc<dyn CacheProvider>,
    /// Refresh engine over `registry` and `cache`.
    pub refresher: Refresher,
}

impl ServiceContext {
    /// Assemble a context from parts.
    pub fn new(
        registry: PathRegistry,
        cache: Arc<dyn CacheProvider>,
        settings: RefreshSettings,
    ) -> Self {
        let registry = Arc::new(registry);
        let refresher = Refresher::new(Arc::clone(&registry), Arc::clone(&cache), settings);
        Self {
            registry,
            cache,
            refresher,
        }
    }

    /// Build the registry from configuration and assemble a context.
    pub fn from_config(config: &AppConfig, cache: Arc<dyn CacheProvider>) -> AppResult<Self> {
        let upstream = UpstreamClients::from_config(&config.upstream)?;
        let registry = build_registry(&config.paths, &upstream)?;
        let settings = RefreshSettings::from_config(&config.cache, &config.broadcast);
        Ok(Self::new(registry, cache, settings))
    }
}
