//! # Remote Problem Sets
//!
//! Turns a public collection URL into problems:
//!
//! - **Classification**: map a URL path to a collection kind and slug
//! - **Fallback Extraction**: structured query, then embedded page state,
//!   then problem links scraped from the page
//! - **Pluggable Transport**: every request goes through [`Transport`]
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Remote Problem Sets                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  classify(url) ──► (CollectionKind, slug)                       │
//! │                          │                                      │
//! │                          ▼                                      │
//! │  ExtractionChain ──► StructuredQuery ─► PageState ─► LinkScrape │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  Transport (HttpTransport)                                      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod chain;
pub mod classify;
pub mod config;
pub mod error;
mod normalize;
pub mod strategy;
pub mod transport;

pub use chain::ExtractionChain;
pub use classify::{
    Classified, CollectionKind, classify, humanize_slug, is_recognized_host, is_supported_url,
};
pub use config::FetchConfig;
pub use error::{ExtractionFailure, FetchError, Result, StageFailure};
pub use strategy::{Extraction, Stage, StageResult};
pub use transport::{HttpTransport, Method, RequestOptions, Transport, TransportResponse};
