use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

use crate::services::client::ClientError;

/// Failures that end the scan of one container.
///
/// Sibling containers of a multi-container scan are unaffected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// Transient failures outlasted the retry budget.
    #[error("backend unavailable for `{container}` after {attempts} attempts: {source}")]
    BackendUnavailable {
        container: String,
        attempts: u32,
        #[source]
        source: ClientError,
    },
    /// The backend returned a page that did not move the cursor forward.
    #[error("pagination fault in `{container}`: cursor did not advance past `{cursor}`")]
    PaginationFault { container: String, cursor: String },
    /// A non-transient backend failure; not retried.
    #[error("backend error for `{container}`: {source}")]
    Backend {
        container: String,
        #[source]
        source: ClientError,
    },
    #[error("scan of `{container}` cancelled")]
    Cancelled { container: String },
}

pub type ScanResult<T> = Result<T, ScanError>;

/// One prefix probe that could not complete.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("probe of prefix `{prefix}` failed: {source}")]
pub struct ProbeFailure {
    pub prefix: String,
    #[source]
    pub source: ClientError,
}

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Status that best describes a failed scan.
    pub fn status_for(err: &ScanError) -> StatusCode {
        match err {
            ScanError::Backend {
                source: ClientError::ContainerNotFound(_),
                ..
            } => StatusCode::NOT_FOUND,
            ScanError::Backend { .. } => StatusCode::BAD_GATEWAY,
            ScanError::BackendUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ScanError::PaginationFault { .. } => StatusCode::BAD_GATEWAY,
            ScanError::Cancelled { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<ScanError> for AppError {
    fn from(err: ScanError) -> Self {
        AppError::new(AppError::status_for(&err), err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}
