//! Unified application error types for livepath.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested path is not registered.
    NotFound,
    /// A path with the same name is already registered.
    Conflict,
    /// Input validation failed (malformed path name, bad message).
    Validation,
    /// A producer failed while computing a value.
    Producer,
    /// A producer did not finish within its deadline.
    Timeout,
    /// A cache backend error occurred.
    Cache,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// A configuration error occurred.
    Configuration,
    /// An upstream data source returned an error or was unreachable.
    ExternalService,
    /// An internal error occurred.
    Internal,
    /// The service is temporarily unavailable.
    ServiceUnavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Producer => write!(f, "PRODUCER"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::Cache => write!(f, "CACHE"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::ExternalService => write!(f, "EXTERNAL_SERVICE"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::ServiceUnavailable => write!(f, "SERVICE_UNAVAILABLE"),
        }
    }
}

/// The unified application error used throughout livepath.
///
/// Path lookups fail with [`ErrorKind::NotFound`], registration conflicts
/// with [`ErrorKind::Conflict`], and producer failures with
/// [`ErrorKind::Producer`] or [`ErrorKind::Timeout`].
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The named path is not registered.
    pub fn path_not_found(path: &str) -> Self {
        Self::new(ErrorKind::NotFound, format!("Path not found: '{path}'"))
    }

    /// A path with this name is already registered.
    pub fn duplicate_path(path: &str) -> Self {
        Self::new(
            ErrorKind::Conflict,
            format!("Path already registered: '{path}'"),
        )
    }

    /// The producer registered under `path` failed.
    pub fn producer(path: &str, message: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::Producer,
            format!("Producer for '{path}' failed: {message}"),
        )
    }

    /// The producer registered under `path` exceeded its deadline.
    pub fn timeout(path: &str, after: Duration) -> Self {
        Self::new(
            ErrorKind::Timeout,
            format!(
                "Producer for '{path}' timed out after {}ms",
                after.as_millis()
            ),
        )
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cache, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an external-service error.
    pub fn external_service(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalService, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a service-unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    /// Whether this error came out of a producer invocation.
    pub fn is_producer_failure(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Producer | ErrorKind::Timeout | ErrorKind::ExternalService
        )
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::path_not_found("server.load");
        assert_eq!(err.to_string(), "NOT_FOUND: Path not found: 'server.load'");
    }

    #[test]
    fn test_clone_drops_source() {
        let io = std::io::Error::other("boom");
        let err = AppError::from(io);
        assert!(err.source.is_some());
        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::Internal);
        assert!(cloned.source.is_none());
    }

    #[test]
    fn test_producer_failure_kinds() {
        assert!(AppError::producer("a.b", "down").is_producer_failure());
        assert!(AppError::timeout("a.b", Duration::from_secs(1)).is_producer_failure());
        assert!(!AppError::duplicate_path("a.b").is_producer_failure());
    }
}
