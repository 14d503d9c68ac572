//! HTTP error responses
//!
//! Every failure becomes a status code plus a JSON body `{error, message}`.
//! Bodies never carry filesystem paths or OS error text; those are logged.

use axum::http::header::CONTENT_RANGE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::error::FileError;
use crate::range::unsatisfied_content_range;

/// JSON error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short machine-matchable label
    pub error: String,
    /// Human-readable explanation
    pub message: String,
}

/// File server error type
#[derive(Error, Debug)]
pub enum ServeError {
    #[error(transparent)]
    File(#[from] FileError),

    #[error("Server bind failed: {reason}")]
    BindFailed { reason: String },

    #[error("Internal server error: {reason}")]
    Internal { reason: String },
}

impl ServeError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServeError::File(FileError::ChecksumMismatch) => StatusCode::UNAUTHORIZED,
            ServeError::File(FileError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ServeError::File(FileError::MalformedRange { .. })
            | ServeError::File(FileError::UnsatisfiableRange { .. }) => {
                StatusCode::RANGE_NOT_SATISFIABLE
            }
            ServeError::File(FileError::Read { .. })
            | ServeError::File(FileError::Config(_))
            | ServeError::BindFailed { .. }
            | ServeError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Response body for this error
    pub fn body(&self) -> ErrorBody {
        let (error, message) = match self {
            ServeError::File(FileError::ChecksumMismatch) => (
                "incorrect checksum",
                "the resource you request is not available or you are not authorized to view it",
            ),
            ServeError::File(FileError::NotFound { .. }) => (
                "file not found",
                "The name of the file that you requested is either incorrect or the file is missing",
            ),
            ServeError::File(FileError::MalformedRange { .. }) => (
                "range not satisfiable",
                "the Range header must have the form bytes=<start>-[<end>] with a single range",
            ),
            ServeError::File(FileError::UnsatisfiableRange { .. }) => (
                "range not satisfiable",
                "the requested range lies outside the resource",
            ),
            _ => ("internal error", "the resource could not be read"),
        };
        ErrorBody {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }

        let mut response = (status, Json(self.body())).into_response();
        if let ServeError::File(err) = &self {
            if let Some(size) = err.range_total_size() {
                if let Ok(value) = HeaderValue::from_str(&unsatisfied_content_range(size)) {
                    response.headers_mut().insert(CONTENT_RANGE, value);
                }
            }
        }
        response
    }
}
