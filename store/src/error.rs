//! Error types for the collection store.

use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in the collection store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Rejected input: blank or duplicate name.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Unknown collection, problem, or category.
    #[error("not found: {0}")]
    NotFound(String),

    /// Problem already present in the collection or category.
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to create storage directory.
    #[error("failed to create directory: {0}")]
    CreateDirectory(String),

    /// Failed to read the collections file.
    #[error("failed to read file: {0}")]
    ReadFile(String),

    /// Failed to write the collections file.
    #[error("failed to write file: {0}")]
    WriteFile(String),

    /// Stored data could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
