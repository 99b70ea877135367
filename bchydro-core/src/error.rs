//! Core error types.

use thiserror::Error;

/// Core error type for model operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A reading could not be interpreted as a decimal number.
    #[error("Invalid decimal reading: {0:?}")]
    InvalidDecimal(String),

    /// Invalid data in a normalized record.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
