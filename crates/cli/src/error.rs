//! Error types for CLI operations.

use thiserror::Error;

/// Errors from a single load-test request
#[derive(Error, Debug)]
pub enum RequestError {
    /// Client-side deadline exceeded
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection or transport failure
    #[error("failed to send request: {0}")]
    Transport(String),

    /// Non-200 response
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// 200 response whose body is not a dispatch outcome
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl RequestError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}
