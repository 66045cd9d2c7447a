//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// Returns 307 Temporary Redirect.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let original_url = state.shortener.resolve(&code).await?;

    debug!(code = %code, "Redirecting to {}", original_url);

    Ok(Redirect::temporary(&original_url))
}
