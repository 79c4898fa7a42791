//! API error handling
//!
//! Every failure reaches the caller as `{"error": "..."}`. Database and
//! backend error text is logged, never returned.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use wisnow_core::WisnowError;

pub const EMPTY_QUESTION: &str = "empty question";
pub const INVALID_BODY: &str = "invalid request body";
pub const BACKEND_UNAVAILABLE: &str = "answer service unavailable";
pub const INTERNAL_ERROR: &str = "internal error";

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Short, caller-safe description
    #[schema(example = "empty question")]
    pub error: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Rejected input; the message is returned as-is
    Validation(String),
    BackendUnavailable(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, ApiError::new(msg)),
            AppError::BackendUnavailable(detail) => {
                tracing::warn!(%detail, "Generative backend unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ApiError::new(BACKEND_UNAVAILABLE),
                )
            }
            AppError::Internal(detail) => {
                tracing::error!(%detail, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new(INTERNAL_ERROR),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<WisnowError> for AppError {
    fn from(err: WisnowError) -> Self {
        match err {
            WisnowError::Validation(msg) => AppError::Validation(msg),
            WisnowError::BackendUnavailable(msg) => AppError::BackendUnavailable(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}
