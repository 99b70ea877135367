//! Portal error types.
//!
//! Each stage of a cycle has its own error: [`AuthError`] for the login,
//! [`FetchError`] for the usage request and [`ParseError`] for the
//! normalizer. [`RefreshError`] wraps whichever one ended the cycle and
//! tells the scheduler what to do about it.

use bchydro_fetch::HttpError;
use thiserror::Error;

// ============================================================================
// Auth Error
// ============================================================================

/// Errors from the login sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The redirect chain did not settle within the hop limit.
    #[error("Too many redirects (limit {limit})")]
    TooManyRedirects {
        /// Hop limit that was exceeded.
        limit: u32,
    },

    /// The landing page carried no session token.
    #[error("Session token not found in login response")]
    TokenNotFound,

    /// Account metadata lacked a required identifier.
    #[error("Account info missing: {0}")]
    AccountInfoMissing(String),

    /// A step answered with neither 200 nor a redirect.
    #[error("Unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    /// A redirect pointed somewhere unusable.
    #[error("Invalid redirect: {0}")]
    InvalidRedirect(String),

    /// Network failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,
}

impl AuthError {
    /// Returns true for network-level failures that say nothing about the
    /// credentials or the provider's format.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::Network(_) | AuthError::Timeout)
    }
}

impl From<HttpError> for AuthError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Timeout => AuthError::Timeout,
            HttpError::Request(e) => AuthError::Network(e.to_string()),
            HttpError::MissingLocation
            | HttpError::InvalidUrl(_)
            | HttpError::DomainNotAllowed(_) => AuthError::InvalidRedirect(err.to_string()),
        }
    }
}

// ============================================================================
// Fetch Error
// ============================================================================

/// Errors from the usage request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Network failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// Non-200 status other than 401/403.
    #[error("Unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    /// The session was rejected; log in again.
    #[error("Session rejected, reauthentication required")]
    ReauthRequired,
}

impl From<HttpError> for FetchError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Timeout => FetchError::Timeout,
            other => FetchError::Network(other.to_string()),
        }
    }
}

// ============================================================================
// Parse Error
// ============================================================================

/// Errors from the response normalizer.
///
/// Only structural damage is an error. Missing nodes or attributes in
/// well-formed XML show up as absent fields in the report instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The payload is not well-formed XML.
    #[error("Malformed usage XML: {0}")]
    Malformed(String),
}

// ============================================================================
// Refresh Error
// ============================================================================

/// What the scheduler should make of a failed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Try again on the next tick; nothing is wrong with the session.
    Retryable,
    /// The session is gone; the next tick logs in again.
    ReauthRequired,
}

/// Outcome of a failed update cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// Login failed.
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Usage request failed.
    #[error("Usage fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Usage response could not be parsed.
    #[error("Usage parse failed: {0}")]
    Parse(#[from] ParseError),
}

impl RefreshError {
    /// Classifies the failure for the scheduler.
    pub fn disposition(&self) -> Disposition {
        match self {
            RefreshError::Auth(e) if e.is_transient() => Disposition::Retryable,
            RefreshError::Auth(_) | RefreshError::Fetch(FetchError::ReauthRequired) => {
                Disposition::ReauthRequired
            }
            RefreshError::Fetch(_) | RefreshError::Parse(_) => Disposition::Retryable,
        }
    }

    /// Returns true if the next tick may simply try again.
    pub fn is_retryable(&self) -> bool {
        self.disposition() == Disposition::Retryable
    }
}
