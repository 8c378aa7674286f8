//! # livepath-cache
//!
//! Cache provider implementations for livepath. Supports two modes:
//!
//! - **memory**: In-process map with per-key expiry, lazily evicted on read
//! - **redis**: Redis-backed cache using the [redis](https://crates.io/crates/redis) crate
//!
//! The provider is selected at runtime based on configuration.

#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
