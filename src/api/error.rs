//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::inference::PredictionError;
use crate::pipeline::extraction::DocumentError;
use crate::pipeline::normalize::NormalizeError;

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
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

impl ApiError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Document(DocumentError::FileTooLarge { .. }) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE")
            }
            ApiError::Document(DocumentError::UnsupportedFormat(_)) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_FORMAT")
            }
            ApiError::Document(_) => (StatusCode::UNPROCESSABLE_ENTITY, "DOCUMENT_UNREADABLE"),
            ApiError::Normalize(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_INPUT"),
            ApiError::Prediction(PredictionError::ModelUnavailable) => {
                (StatusCode::SERVICE_UNAVAILABLE, "MODEL_UNAVAILABLE")
            }
            ApiError::Prediction(PredictionError::InvalidRecord(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_RECORD")
            }
            ApiError::Prediction(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PREDICTION_FAILED"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(code, error = %self, "API request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
