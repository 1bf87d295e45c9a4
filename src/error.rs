use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

use crate::store::StoreError;

/// Errors surfaced to API callers as `{"error": "..."}` bodies.
#[derive(Debug, Display, PartialEq)]
pub enum ApiError {
    /// No bearer credential was presented
    #[display(fmt = "{}", _0)]
    Unauthorized(String),
    /// A credential was presented but failed verification
    #[display(fmt = "{}", _0)]
    Forbidden(String),
    #[display(fmt = "{}", _0)]
    Validation(String),
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "{}", _0)]
    Conflict(String),
    /// The store rejected or failed a write
    #[display(fmt = "{}", _0)]
    WriteFailed(String),
    /// The store failed a read
    #[display(fmt = "{}", _0)]
    ReadFailed(String),
    #[display(fmt = "Internal Server Error")]
    Internal,
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) | ApiError::WriteFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ReadFailed(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

impl ApiError {
    /// Maps a failed store write, keeping not-found and conflict distinct.
    pub fn from_write(err: StoreError, message: &str) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Subject not found".to_string()),
            StoreError::Conflict => ApiError::Conflict("Resource already exists".to_string()),
            StoreError::Backend(e) => {
                tracing::error!(error = %e, "Store write failed");
                ApiError::WriteFailed(message.to_string())
            }
        }
    }

    pub fn from_read(err: StoreError, message: &str) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Subject not found".to_string()),
            other => {
                tracing::error!(error = %other, "Store read failed");
                ApiError::ReadFailed(message.to_string())
            }
        }
    }
}
