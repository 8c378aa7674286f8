//! Request handlers.

pub mod health;
pub mod path;
pub mod paths;
pub mod ws;
