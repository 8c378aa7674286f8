//! Path listing handler.

use axum::Json;
use axum::extract::State;

use livepath_service::registry::PathInfo;

use crate::dto::response::ApiResponse;
use crate::state::AppState;

/// GET /api/paths: registered paths in registration order.
pub async fn list_paths(State(state): State<AppState>) -> Json<ApiResponse<Vec<PathInfo>>> {
    let paths = state
        .services
        .registry
        .list_all()
        .iter()
        .map(|entry| entry.info())
        .collect();

    Json(ApiResponse::ok(paths))
}
