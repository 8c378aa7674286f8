//! # livepath-service
//!
//! The path-resolution engine. [`PathRegistry`] maps path names to
//! producers, [`Refresher`] decides between a cached value and a fresh
//! recomputation, and [`catalog`] builds the registry from configuration.
//!
//! Everything is wired through an explicitly constructed
//! [`ServiceContext`]; there is no global state.

pub mod catalog;
pub mod context;
pub mod refresh;
pub mod registry;

pub use context::ServiceContext;
pub use refresh::{RefreshSettings, RefreshStatsSnapshot, Refresher};
pub use registry::{PathEntry, PathInfo, PathRegistry};
