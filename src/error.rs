use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::application::services::ShortenerError;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    NotFound { message: String, details: Value },
    Conflict { message: String, details: Value },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, message, details) = match self {
            AppError::Validation { message, details } => ("validation_error", message, details),
            AppError::NotFound { message, details } => ("not_found", message, details),
            AppError::Conflict { message, details } => ("conflict", message, details),
            AppError::Internal { message, details } => ("internal_error", message, details),
        };

        ErrorInfo {
            code,
            message: message.clone(),
            details: details.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let info = self.to_error_info();
        write!(f, "{}: {}", info.code, info.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ShortenerError> for AppError {
    fn from(err: ShortenerError) -> Self {
        match err {
            ShortenerError::NotFound { short_code } => {
                AppError::not_found("Short link not found", json!({ "code": short_code }))
            }
            ShortenerError::DuplicateOriginConflict {
                short_code,
                existing_url,
            } => AppError::conflict(
                "Short code already maps to a different URL",
                json!({ "code": short_code, "existing_url": existing_url }),
            ),
            ShortenerError::AlreadyShortened {
                original_url,
                short_code,
            } => AppError::conflict(
                "URL is already shortened with a different code",
                json!({ "url": original_url, "code": short_code }),
            ),
            ShortenerError::GenerationExhausted {
                original_url,
                attempts,
            } => {
                tracing::error!(url = %original_url, attempts, "Short code generation exhausted");
                AppError::internal(
                    "Failed to generate unique code",
                    json!({ "reason": "Too many collisions" }),
                )
            }
            ShortenerError::InvalidCode(e) => {
                AppError::bad_request(e.to_string(), json!({ "field": "custom_code" }))
            }
            ShortenerError::Backend(e) => {
                tracing::error!(error = %e, "Storage backend failure");
                AppError::internal("Storage backend failure", json!({}))
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
        AppError::bad_request("Validation failed", json!({ "fields": fields }))
    }
}
