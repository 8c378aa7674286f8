//! Core traits for pluggable components.
//!
//! These traits define the seams between the refresh engine and its
//! collaborators: where values are cached, how they are computed, and
//! where broadcast results are delivered.

pub mod cache;
pub mod producer;
pub mod sink;

pub use cache::CacheProvider;
pub use producer::Producer;
pub use sink::OutputSink;
