//! Handler for looking up the original URL of a short code.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::resolve::ResolveResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the original URL behind a short code without redirecting.
///
/// # Endpoint
///
/// `GET /api/resolve/{code}`
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown.
pub async fn resolve_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ResolveResponse>, AppError> {
    let url = state.shortener.resolve(&code).await?;

    Ok(Json(ResolveResponse { code, url }))
}
