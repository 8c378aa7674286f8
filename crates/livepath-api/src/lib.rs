//! # livepath-api
//!
//! HTTP API layer for livepath built on Axum.
//!
//! - `GET /{path...}`: cache-first on-demand query of a path
//! - `GET /api/paths`: registered paths with their descriptions
//! - `GET /api/health`, `GET /api/health/detailed`: liveness and internals
//! - `GET /ws`: WebSocket subscriptions to broadcast updates

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
