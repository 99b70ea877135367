//! Transport error types.

use thiserror::Error;

// ============================================================================
// HTTP Error
// ============================================================================

/// HTTP-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error (connection refused, reset, TLS, body read).
    #[error("Request error: {0}")]
    Request(reqwest::Error),

    /// The request exceeded its timeout.
    #[error("Request timed out")]
    Timeout,

    /// Domain not allowed.
    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A redirect response carried no usable `Location` header.
    #[error("Redirect without a Location header")]
    MissingLocation,
}

impl HttpError {
    /// Returns true if this is a network-level failure worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, HttpError::Request(_) | HttpError::Timeout)
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HttpError::Timeout
        } else {
            HttpError::Request(err)
        }
    }
}
