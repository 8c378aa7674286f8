//! Convenience result type alias for livepath.

use crate::error::AppError;

/// A specialized `Result` type for livepath operations.
pub type AppResult<T> = Result<T, AppError>;
