//! Collection persistence.
//!
//! Backends read and write the whole collection set at once. There is no
//! partial write and no transaction log.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::error::StorageError;
use crate::model::Collection;

/// Whole-set persistence substrate for collections.
#[async_trait]
pub trait CollectionBackend: Send + Sync {
    /// Read every stored collection.
    async fn load_all(&self) -> Result<Vec<Collection>, StorageError>;

    /// Replace the stored set with `collections`.
    async fn save_all(&self, collections: &[Collection]) -> Result<(), StorageError>;
}

/// Stores collections as a pretty-printed JSON array in a single file.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Create a backend for the given file path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CollectionBackend for JsonFileBackend {
    async fn load_all(&self) -> Result<Vec<Collection>, StorageError> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| StorageError::ReadFile(format!("{}: {e}", self.path.display())))?;

        let collections: Vec<Collection> = serde_json::from_str(&content)?;
        debug!(
            "Read {} collections from {}",
            collections.len(),
            self.path.display()
        );
        Ok(collections)
    }

    async fn save_all(&self, collections: &[Collection]) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(collections)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::CreateDirectory(format!("{}: {e}", parent.display())))?;
        }

        // Write atomically
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content)
            .await
            .map_err(|e| StorageError::WriteFile(format!("{}: {e}", temp_path.display())))?;

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StorageError::WriteFile(format!("{}: {e}", self.path.display())))?;

        debug!(
            "Saved {} collections to {}",
            collections.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Keeps the serialized collection set in memory.
///
/// Round-trips through JSON like the file backend, so stored data has the
/// same shape and the same failure modes.
#[derive(Default)]
pub struct MemoryBackend {
    data: Mutex<Option<String>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend preloaded with raw stored text.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            data: Mutex::new(Some(raw.into())),
        }
    }

    /// The raw stored text, if anything was saved.
    pub fn raw(&self) -> Option<String> {
        self.data.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl CollectionBackend for MemoryBackend {
    async fn load_all(&self) -> Result<Vec<Collection>, StorageError> {
        let raw = self
            .data
            .lock()
            .map_err(|e| StorageError::ReadFile(format!("memory backend poisoned: {e}")))?
            .clone();
        match raw {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn save_all(&self, collections: &[Collection]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(collections)?;
        *self
            .data
            .lock()
            .map_err(|e| StorageError::WriteFile(format!("memory backend poisoned: {e}")))? =
            Some(raw);
        Ok(())
    }
}
