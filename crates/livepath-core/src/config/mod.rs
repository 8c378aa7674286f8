//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod broadcast;
pub mod cache;
pub mod logging;
pub mod paths;
pub mod realtime;
pub mod upstream;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::broadcast::BroadcastConfig;
pub use self::cache::CacheConfig;
pub use self::logging::LoggingConfig;
pub use self::paths::{PathConfig, SourceConfig};
pub use self::realtime::RealtimeConfig;
pub use self::upstream::UpstreamConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Cache provider settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Periodic broadcast settings.
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    /// WebSocket settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Upstream data source endpoints.
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Registered paths, in registration order.
    #[serde(default)]
    pub paths: Vec<PathConfig>,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `LIVEPATH__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("LIVEPATH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
