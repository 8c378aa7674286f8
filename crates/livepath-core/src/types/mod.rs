//! Shared value types.

pub mod path;
pub mod payload;

pub use path::{path_from_url, validate_path_name};
pub use payload::Payload;
