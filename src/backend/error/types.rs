/**
 * Backend Error Types
 *
 * `BackendError` is what HTTP handlers return. It wraps the plan taxonomy
 * and adds the request-level failures that happen before a plan operation
 * runs (bad headers, missing authentication, malformed bodies).
 *
 * # Error Categories
 *
 * - `Plan` - A plan operation rejected the request or failed internally
 * - `HandlerError` - Request-level failure with an explicit status
 * - `InvalidBody` - The JSON body could not be read or decoded
 */

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::plan::error::PlanError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use axum::http::StatusCode;
/// use tripcollab::backend::error::BackendError;
///
/// let err = BackendError::handler(StatusCode::BAD_REQUEST, "Invalid request");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Plan operation error
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// Handler error (e.g., missing headers, invalid request)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Request body rejected by the JSON extractor
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `Plan` - The status of the plan error kind
    /// - `HandlerError` - Uses the status code from the error
    /// - `InvalidBody` - The extractor's status (400, 415 or 422)
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Plan(err) => err.status_code(),
            Self::HandlerError { status, .. } => *status,
            Self::InvalidBody(rejection) => rejection.status(),
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Plan(err) => err.code(),
            Self::HandlerError { status, .. } if status.is_server_error() => "COMMON-500",
            Self::HandlerError { status, .. } if *status == StatusCode::UNAUTHORIZED => "AUTH-401",
            Self::HandlerError { .. } | Self::InvalidBody(_) => "COMMON-400",
        }
    }

    /// Message returned to the client
    ///
    /// Internal failures are reported generically; their details go to the log.
    pub fn message(&self) -> String {
        match self {
            Self::Plan(err) if err.is_internal() => "Internal server error".to_string(),
            Self::Plan(err) => err.to_string(),
            Self::HandlerError { message, .. } => message.clone(),
            Self::InvalidBody(rejection) => rejection.body_text(),
        }
    }
}
