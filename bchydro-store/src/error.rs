//! Store error types.

use thiserror::Error;

/// Errors that can occur loading or saving configuration.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No username or password in the file or the environment.
    #[error("Missing credentials: set {0} or run `bchydro config set-credentials`")]
    MissingCredentials(&'static str),
}
