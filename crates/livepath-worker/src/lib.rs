//! Background work for livepath.
//!
//! This crate provides the [`BroadcastLoop`]: on every tick it force-refreshes
//! each topic that has subscribers and hands the result to an output sink.

pub mod broadcast;

pub use broadcast::{BroadcastLoop, LoopState, TickReport};
