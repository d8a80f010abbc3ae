//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::PipelineError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Extraction service quota exceeded")]
    RateLimited,
    #[error("Extraction service unavailable: {0}")]
    Upstream(String),
    #[error("No usable data in {chunks} chunks")]
    NoUsableData { chunks: usize },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Extraction service quota exceeded, retry later".to_string(),
            ),
            ApiError::Upstream(detail) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", detail.clone())
            }
            ApiError::NoUsableData { chunks } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "NO_USABLE_DATA",
                format!("None of the {chunks} statement chunks produced usable data"),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::QuotaExceeded { .. } => ApiError::RateLimited,
            PipelineError::NoUsableData { chunks } => ApiError::NoUsableData { chunks },
            PipelineError::Connection(_)
            | PipelineError::Transport(_)
            | PipelineError::ApiStatus { .. }
            | PipelineError::EmptyResponse => ApiError::Upstream(err.to_string()),
            // Chunk-local failures are absorbed by the orchestrator; reaching
            // here means a bug, so report them as internal.
            PipelineError::UnparseableResponse(_) | PipelineError::InvalidPayload { .. } => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}
