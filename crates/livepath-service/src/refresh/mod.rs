//! Cache-or-recompute resolution of path values.

pub mod refresher;
pub mod stats;

pub use refresher::{RefreshSettings, Refresher};
pub use stats::{RefreshStats, RefreshStatsSnapshot};
