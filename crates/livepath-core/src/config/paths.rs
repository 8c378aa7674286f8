//! Path registration entries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One path to register at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    /// Dot-delimited path name, e.g. `switch.interfaces`.
    pub name: String,
    /// Human-readable description for the path listing.
    #[serde(default)]
    pub description: String,
    /// What computes the path's value.
    pub source: SourceConfig,
}

/// Producer definition for a configured path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// A fixed JSON value.
    Static {
        /// The value returned on every invocation.
        value: serde_json::Value,
    },
    /// The current wall-clock time in epoch milliseconds.
    Clock,
    /// A Graphite render query.
    Graphite {
        /// Graphite target expression.
        target: String,
        /// Extra render parameters (`from`, `until`, ...).
        #[serde(default)]
        options: BTreeMap<String, String>,
    },
    /// A Prometheus instant query.
    Prometheus {
        /// PromQL expression.
        query: String,
        /// When set, results are reshaped into `{label value: sample}`.
        #[serde(default)]
        label: Option<String>,
    },
    /// Several already-registered paths merged into one object.
    Composed {
        /// Names of the parts, each registered earlier in the list.
        parts: Vec<String>,
    },
}
