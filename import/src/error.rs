//! Error types for URL imports.

use std::path::PathBuf;

use problist_fetch::{ExtractionFailure, FetchError};
use problist_store::StoreError;
use thiserror::Error;

/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;

/// Errors that can occur during an import.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The URL is not an importable collection.
    #[error("validation error: {0}")]
    Validation(String),

    /// No stage found any problems.
    #[error(transparent)]
    Extraction(ExtractionFailure),

    /// Fetch machinery failed before any stage ran.
    #[error("fetch error: {0}")]
    Fetch(FetchError),

    /// The store rejected the new collection.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The import was cancelled between phases.
    #[error("import cancelled")]
    Cancelled,

    /// Failed to read a configuration file.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse a configuration file.
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl From<FetchError> for ImportError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Extraction(failure) => ImportError::Extraction(failure),
            other => ImportError::Fetch(other),
        }
    }
}
