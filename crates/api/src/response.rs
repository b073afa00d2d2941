//! Standardized API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use clicker_core::ValidationErrorCode;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Success response for a registered click.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClickResponse {
    pub status: String,
}

impl ClickResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub clickhouse_connected: bool,
    pub aggregator_running: bool,
    pub queue_depth: usize,
    pub queue_capacity: usize,
    pub pending_banners: usize,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// API error type carrying an error code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
}

impl ApiError {
    pub fn with_code(status: StatusCode, code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(msg, code),
        }
    }

    pub fn validation(code: ValidationErrorCode, msg: impl Into<String>) -> Self {
        let status = StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::BAD_REQUEST);
        Self::with_code(status, code.code(), msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<clicker_core::Error> for ApiError {
    fn from(err: clicker_core::Error) -> Self {
        let status =
            StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error = %err, "Request failed");
        }

        let message = match &err {
            clicker_core::Error::ValidationWithCode { message, .. }
            | clicker_core::Error::Database { message, .. } => message.clone(),
            other => other.to_string(),
        };

        let code = match err.error_code() {
            Some(code) => code,
            None if status.is_client_error() => "BAD_REQUEST",
            None => "INTERNAL",
        };

        ApiError::with_code(status, code, message)
    }
}
