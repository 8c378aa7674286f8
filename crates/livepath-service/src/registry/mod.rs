//! Path registry.

pub mod entry;
pub mod store;

pub use entry::{PathEntry, PathInfo};
pub use store::PathRegistry;
