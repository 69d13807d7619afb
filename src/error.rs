// src/error.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Streaming Pipeline Error
// ============================================================================

/// Failures raised while producing or encoding one response stream.
///
/// `Generator` is the only recoverable kind: encoders translate it into an
/// error frame and close the stream cleanly. Every other variant aborts the
/// stream without emitting anything further.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error("generator failed: {0}")]
    Generator(String),

    #[error("frame serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StreamError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedEvent(message.into())
    }

    pub fn generator(message: impl Into<String>) -> Self {
        Self::Generator(message.into())
    }
}

// ============================================================================
// Main Error Type
// ============================================================================

/// A request rejected before its response stream started.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

// ============================================================================
// Error Codes
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCode {
    BadRequest,
}

impl ErrorCode {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BadRequest => "BAD_REQUEST",
        };
        write!(f, "{}", s)
    }
}

// ============================================================================
// Result Type Alias
// ============================================================================

pub type Result<T> = std::result::Result<T, AppError>;

// ============================================================================
// Error Response for HTTP
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: AppError,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: AppError) -> Self {
        Self {
            error,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

// ============================================================================
// HTTP Response Conversion
// ============================================================================

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        log_error(&self);

        let status = StatusCode::from_u16(self.code.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(ErrorResponse::new(self))).into_response()
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn log_error(error: &AppError) {
    log::warn!("{}", error);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_stream_error_display() {
        assert_eq!(
            StreamError::malformed("expected string or object").to_string(),
            "malformed event: expected string or object"
        );
        assert_eq!(
            StreamError::generator("timeout").to_string(),
            "generator failed: timeout"
        );
    }

    #[test]
    fn test_serde_error_converts_to_serialization() {
        let err: StreamError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, StreamError::Serialization(_)));
    }

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("missing messages");
        let display = format!("{}", err);
        assert!(display.contains("BAD_REQUEST"));
        assert!(display.contains("missing messages"));
    }

    #[test]
    fn test_bad_request_response_status() {
        let err = AppError::bad_request("missing messages");
        assert_eq!(err.code.http_status(), 400);

        let response = err.into_response();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
