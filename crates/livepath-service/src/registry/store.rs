//! Path registry store.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use livepath_core::error::AppError;
use livepath_core::result::AppResult;
use livepath_core::traits::producer::Producer;
use livepath_core::types::path::validate_path_name;

use super::entry::PathEntry;

/// Maps path names to their producers.
///
/// Populated at startup and shared immutably afterwards. Registering a
/// name twice is rejected.
#[derive(Debug, Default)]
pub struct PathRegistry {
    /// Name → index into `entries`.
    index: HashMap<String, usize>,
    /// Entries in registration order.
    entries: Vec<Arc<PathEntry>>,
}

impl PathRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a producer under `name`.
    pub fn register(
        &mut self,
        name: &str,
        producer: Arc<dyn Producer>,
        description: &str,
    ) -> AppResult<()> {
        validate_path_name(name)?;

        if self.index.contains_key(name) {
            return Err(AppError::duplicate_path(name));
        }

        debug!(path = %name, kind = producer.kind(), "Registered path");

        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push(Arc::new(PathEntry {
            name: name.to_string(),
            description: description.to_string(),
            producer,
        }));
        Ok(())
    }

    /// Look up a registered path.
    pub fn lookup(&self, name: &str) -> AppResult<Arc<PathEntry>> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.entries[i]))
            .ok_or_else(|| AppError::path_not_found(name))
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All entries in registration order.
    pub fn list_all(&self) -> &[Arc<PathEntry>] {
        &self.entries
    }

    /// Number of registered paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no path is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
