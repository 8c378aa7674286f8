//! Registered path entries.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use livepath_core::traits::producer::Producer;

/// A registered path: its name, documentation, and producer.
///
/// Immutable once registered.
#[derive(Debug, Clone)]
pub struct PathEntry {
    /// Dot-delimited path name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Routine that computes the current value.
    pub producer: Arc<dyn Producer>,
}

impl PathEntry {
    /// Serializable summary for documentation listings.
    pub fn info(&self) -> PathInfo {
        PathInfo {
            name: self.name.clone(),
            description: self.description.clone(),
            kind: self.producer.kind().to_string(),
        }
    }
}

/// Public description of a registered path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathInfo {
    /// Path name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Producer kind (`static`, `clock`, `graphite`, ...).
    pub kind: String,
}
