//! DTOs for the shortening endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shorten one URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL to shorten. Stored exactly as sent.
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    /// Optional caller-chosen short code.
    #[validate(length(min = 4, max = 32))]
    pub custom_code: Option<String>,
}

/// Response for a created or existing short link.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub url: String,
    pub code: String,
    pub short_url: String,
}
