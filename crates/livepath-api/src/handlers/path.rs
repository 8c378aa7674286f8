//! On-demand path query handler.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use livepath_core::types::path::path_from_url;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /{path...}: the path's current value, served from the cache when
/// still fresh. `/Server/Load` resolves `server.load`.
pub async fn get_path(
    State(state): State<AppState>,
    Path(url_path): Path<String>,
) -> Result<Response, ApiError> {
    let name = path_from_url(&url_path);
    let payload = state.services.refresher.resolve(&name, false).await?;

    Ok((
        [(header::CONTENT_TYPE, "application/json")],
        payload.to_string(),
    )
        .into_response())
}
