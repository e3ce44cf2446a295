//! # URL Import
//!
//! Creates a collection from a public collection URL:
//!
//! - **Validation**: recognized host and classifiable path
//! - **Extraction**: the fallback chain from `problist-fetch`
//! - **Persistence**: one import-mode create followed by one populate
//! - **Cancellation**: checked between phases
//!
//! [`ImportConfig`] also carries the storage location, so a front end can
//! build both the store and the pipeline from one file.

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::ImportConfig;
pub use error::{ImportError, Result};
pub use pipeline::ImportPipeline;
pub use tokio_util::sync::CancellationToken;
