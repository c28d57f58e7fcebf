//! Error types for signaling operations.

use thiserror::Error;

/// Errors that can occur during a signaling round-trip.
#[derive(Debug, Error)]
pub enum SignalingError {
    /// Base URL failed to parse.
    #[error("Invalid signaling URL: {0}")]
    InvalidUrl(String),

    /// Round-trip exceeded the request budget.
    #[error("Signaling request timed out")]
    Timeout,

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Server answered with a non-success status.
    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,

        /// Response body, truncated for logging.
        body: String,
    },

    /// Response body was not the JSON shape we expected.
    #[error("Malformed server response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for SignalingError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(e.to_string())
        }
    }
}
