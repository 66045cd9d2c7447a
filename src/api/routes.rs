//! API route configuration.

use crate::api::handlers::{resolve_handler, shorten_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All API routes.
///
/// # Endpoints
///
/// - `POST /shorten`         - Create or fetch the short code of a URL
/// - `GET  /resolve/{code}`  - Original URL behind a short code
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/resolve/{code}", get(resolve_handler))
}
