//! Common error types for the vault editor.

use thiserror::Error;

/// Top-level error type for vault editor operations.
///
/// Store operations absorb these into no-ops; they surface only at
/// construction boundaries (snapshot validation, config parsing).
#[derive(Debug, Error)]
pub enum Error {
    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not permitted in the current state.
    #[error("Not permitted: {0}")]
    NotPermitted(String),

    /// Referenced item not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Item already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Structural conflict detected.
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
