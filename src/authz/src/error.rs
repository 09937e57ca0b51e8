//! Error types for the access-control engine

use thiserror::Error;

/// Access-control engine errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource provider call failed during a table build
    #[error("Resource provider error: {0}")]
    Provider(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for access-control operations
pub type Result<T> = std::result::Result<T, AuthzError>;
