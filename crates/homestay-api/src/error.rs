//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps calculator, lifecycle, and validation errors to HTTP status codes
//! and a JSON body of the form `{"error": {"code", "message", "details"}}`.
//! Internal error details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use homestay_calc::CalcError;
use homestay_core::{StateTransitionError, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional context for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type returned by every handler.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Form validation or calculator rejection (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid bearer token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Conflict with current record state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Message shown to the client: the variant payload, or a fixed string
    /// for internal errors.
    fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::NotFound(m)
            | Self::Validation(m)
            | Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::Conflict(m) => m.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.public_message(),
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Calculator rejections are input problems.
impl From<CalcError> for AppError {
    fn from(err: CalcError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Lifecycle violations conflict with the record's current state.
impl From<StateTransitionError> for AppError {
    fn from(err: StateTransitionError) -> Self {
        Self::Conflict(err.to_string())
    }
}
