//! Error types for the host agent

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Message returned for every failure the caller cannot act on
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to eval command. Please try again later...";

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the host agent
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the error code
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidRequest(_) => 1001,
            Error::Internal(_) => 1003,
            Error::Unauthorized => 1005,
        }
    }

    /// Get the HTTP status code
    ///
    /// Invalid requests share the 500 of internal failures; callers of the
    /// command endpoint only ever see the generic retry message for both.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::InvalidRequest(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed on the wire
    fn public_message(&self) -> String {
        match self {
            Error::Unauthorized => self.to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.code(), "{}", self);
        }

        let body = ErrorResponse {
            ok: false,
            message: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}
