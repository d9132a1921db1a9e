//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses with appropriate status codes.
//! Storage failures are logged and reported without internal detail.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::repos::RepoError;
use crate::models::ValidationError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Device not found (404)
    NotFound { id: i64 },

    /// Duplicate name and brand (422)
    Conflict { name: String, brand: String },

    /// Storage error (500, logged)
    Storage(RepoError),

    /// Request refused before decoding, e.g. body over the size limit
    Rejected { status: StatusCode, message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Rejected { status, .. } => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation(e) => {
                tracing::warn!(error = %e, "rejected request");
                json!({
                    "error": "validation_error",
                    "message": e.to_string()
                })
            }
            Self::NotFound { id } => {
                tracing::warn!(id, "device not found");
                json!({
                    "error": "not_found",
                    "message": format!("Device with id {} not found", id)
                })
            }
            Self::Conflict { name, brand } => {
                tracing::warn!(%name, %brand, "duplicate device");
                json!({
                    "error": "conflict",
                    "message": format!("Device {} ({}) already exists", name, brand)
                })
            }
            Self::Storage(e) => {
                tracing::error!(error = %e, "storage error");
                json!({
                    "error": "internal_error",
                    "message": "an internal error occurred"
                })
            }
            Self::Rejected { message, .. } => {
                tracing::warn!(%status, %message, "request rejected");
                json!({
                    "error": "request_rejected",
                    "message": message
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound { id } => Self::NotFound { id },
            RepoError::ConstraintViolation { name, brand } => Self::Conflict { name, brand },
            RepoError::Storage(_) => Self::Storage(e),
        }
    }
}
