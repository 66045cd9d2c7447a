//! Handler for link shortening endpoint.

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Returns the short code for a URL, creating it on first use.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com",
///   "custom_code": "my-link"     // optional
/// }
/// ```
///
/// # Response
///
/// `201 Created`:
///
/// ```json
/// {
///   "url": "https://example.com",
///   "code": "4LzVq1b",
///   "short_url": "http://localhost:3000/4LzVq1b"
/// }
/// ```
///
/// Shortening the same URL again returns the same code.
///
/// # Errors
///
/// - 400 Bad Request if validation fails
/// - 409 Conflict if a custom code is taken or the URL has a different code
/// - 500 Internal Server Error if no unique code could be derived or the store fails
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;

    let code = match payload.custom_code.as_deref() {
        Some(custom_code) => {
            state
                .shortener
                .shorten_with_code(&payload.url, custom_code)
                .await?
        }
        None => state.shortener.shorten(&payload.url).await?,
    };

    let short_url = state.shortener.short_url(&state.base_url, &code);

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse {
            url: payload.url,
            code,
            short_url,
        }),
    ))
}
