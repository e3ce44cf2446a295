//! Error types for remote extraction.

use thiserror::Error;

use crate::classify::CollectionKind;

/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;

/// Errors that can occur while fetching remote problem sets.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Transport failure outside of HTTP.
    #[error("transport error: {0}")]
    Transport(String),

    /// Every extraction stage failed.
    #[error(transparent)]
    Extraction(#[from] ExtractionFailure),

    /// A scraping pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex_lite::Error),
}

/// Every stage of the extraction chain failed for one remote collection.
///
/// Carries the reasons from the structured query and the page-state scrape;
/// the link scrape is the last resort and only fails by finding nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "no problems found for {kind} \"{slug}\" (structured query: {structured}; page state: {page_state})"
)]
pub struct ExtractionFailure {
    /// Kind of remote collection.
    pub kind: CollectionKind,

    /// Remote collection slug.
    pub slug: String,

    /// Why the structured query produced nothing.
    pub structured: String,

    /// Why the embedded page-state scrape produced nothing.
    pub page_state: String,
}

/// Why a single stage produced no problems.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageFailure {
    /// The request could not be made.
    #[error("request failed: {0}")]
    Request(String),

    /// Non-success HTTP status.
    #[error("HTTP {0}")]
    Status(u16),

    /// The response carried an explicit error.
    #[error("remote error: {0}")]
    Remote(String),

    /// The response did not have the expected shape.
    #[error("unexpected response: {0}")]
    Shape(String),

    /// The stage ran but found nothing.
    #[error("no problems found")]
    Empty,

    /// The stage was not part of this run.
    #[error("not attempted")]
    Skipped,
}
