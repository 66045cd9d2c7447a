//! DTOs for the resolve endpoint.

use serde::Serialize;

/// Original URL behind a short code.
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub code: String,
    pub url: String,
}
