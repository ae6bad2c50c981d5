//! Error types for the page server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

// == App Error Enum ==
/// Unified error type for the page server.
#[derive(Error, Debug)]
pub enum AppError {
    /// Rejected input (empty content, bad encoding, unknown retention option)
    #[error("{0}")]
    Validation(String),

    /// Content above the configured maximum size
    #[error("{0}")]
    TooLarge(String),

    /// Page absent or expired; the two are deliberately indistinguishable
    #[error("Page not found")]
    NotFound,

    /// Durable read or write failed
    #[error("Storage failure: {0}")]
    Storage(#[from] sqlx::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::TooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg.clone()),
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Storage(err) => {
                error!(error = %err, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the page server.
pub type Result<T> = std::result::Result<T, AppError>;
