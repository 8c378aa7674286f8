//! # livepath-core
//!
//! Core crate for livepath. Contains the error system, configuration
//! schemas, path-name types, and the traits every other crate plugs into:
//! cache backends, data producers, and output sinks.
//!
//! This crate has **no** internal dependencies on other livepath crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
