//! # Collection Store
//!
//! Persisted, named collections of problems:
//!
//! - **Collections**: user-created or imported groups of problems
//! - **Categories**: optional sub-groupings that reference the flat list
//! - **Duplicate Prevention**: a problem id appears at most once per collection
//! - **Write-Through Persistence**: every mutation saves the whole set
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Collection Store                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  CollectionStore ──► Collection ──► Category ──► Problem       │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  CollectionBackend (JsonFileBackend / MemoryBackend)           │
//! │       ▲                                                         │
//! │  OfficialCatalog ── sync_official                               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod model;
pub mod official;
pub mod storage;
pub mod store;

pub use error::{Result, StorageError, StoreError};
pub use model::{Category, Collection, CollectionUpdate, Problem};
pub use official::{OfficialCatalog, OfficialList};
pub use storage::{CollectionBackend, JsonFileBackend, MemoryBackend};
pub use store::{CollectionStore, CreateMode};
