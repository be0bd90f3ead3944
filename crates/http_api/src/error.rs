//! HTTP error types

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;
use tracing::{error, warn};

/// Errors surfaced by the HTTP layer
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body is not a JSON array of events
    #[error("invalid request body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Request body exceeds the configured size limit
    #[error("request body too large: {0}")]
    PayloadTooLarge(BytesRejection),

    /// Request body could not be read
    #[error("failed to read request body: {0}")]
    Body(BytesRejection),

    /// Listener or server failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Body(rejection) => rejection.status(),
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metric label for a rejected request
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidJson(_) => "invalid_json",
            Self::PayloadTooLarge(_) => "body_too_large",
            Self::Body(_) => "body_unreadable",
            Self::Io(_) => "io",
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidJson(_) => "Invalid JSON format",
            Self::PayloadTooLarge(_) => "Request body too large",
            Self::Body(_) => "Failed to read request body",
            Self::Io(_) => "Internal server error",
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(rejection)
        } else {
            Self::Body(rejection)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Io(e) => error!(error = %e, "Request failed"),
            other => warn!(error = %other, "Rejected request body"),
        }

        (
            self.status(),
            Json(serde_json::json!({ "error": self.public_message() })),
        )
            .into_response()
    }
}
