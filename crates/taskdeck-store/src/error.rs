//! Error types for taskdeck persistence.

use thiserror::Error;

/// Result alias for persistence operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while loading or saving the task blob.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O operation on the backing medium failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The task collection could not be serialized.
    #[error("Failed to encode tasks: {0}")]
    Encode(#[source] serde_json::Error),

    /// The stored blob is not a valid task collection.
    #[error("Failed to decode tasks: {0}")]
    Decode(#[source] serde_json::Error),

    /// The backing store refused the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
