//! Import configuration.

use std::path::{Path, PathBuf};

use problist_fetch::FetchConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ImportError, Result};

/// Configuration for the import pipeline and the store it writes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Remote site settings.
    pub fetch: FetchConfig,

    /// JSON file holding every collection.
    pub storage_path: PathBuf,
}

impl ImportConfig {
    /// Create a configuration storing collections at `storage_path`.
    pub fn new(storage_path: impl Into<PathBuf>) -> Self {
        Self {
            fetch: FetchConfig::default(),
            storage_path: storage_path.into(),
        }
    }

    /// Set the fetch configuration.
    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from {}", path.display());

        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ImportError::ConfigRead {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml(&text)
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self::new(
            dirs::data_dir()
                .unwrap_or_default()
                .join("problist/collections.json"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_storage_path() {
        let config = ImportConfig::default();
        assert!(config.storage_path.ends_with("problist/collections.json"));
        assert_eq!(config.fetch, FetchConfig::default());
    }

    #[test]
    fn test_from_toml_overrides_nested_keys() {
        let config = ImportConfig::from_toml(
            r#"
            storage_path = "/tmp/lists.json"

            [fetch]
            site_base_url = "https://leetcode.cn"
            link_scrape_cap = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.storage_path, PathBuf::from("/tmp/lists.json"));
        assert_eq!(config.fetch.site_base_url, "https://leetcode.cn");
        assert_eq!(config.fetch.link_scrape_cap, 20);
        assert_eq!(config.fetch.page_size, 100);
    }

    #[test]
    fn test_builder_sets_fetch() {
        let fetch = FetchConfig::default().with_site("https://leetcode.cn");
        let config = ImportConfig::new("/tmp/lists.json").with_fetch(fetch.clone());
        assert_eq!(config.fetch, fetch);
        assert_eq!(config.storage_path, PathBuf::from("/tmp/lists.json"));
    }

    #[test]
    fn test_from_toml_rejects_bad_types() {
        let err = ImportConfig::from_toml("storage_path = 5").unwrap_err();
        assert!(matches!(err, ImportError::ConfigParse(_)));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = ImportConfig::load(temp_dir.path().join("absent.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::ConfigRead { .. }));
    }

    #[tokio::test]
    async fn test_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("problist.toml");
        tokio::fs::write(&path, "[fetch]\ntimeout_secs = 5\n")
            .await
            .unwrap();

        let config = ImportConfig::load(&path).await.unwrap();
        assert_eq!(config.fetch.timeout_secs, 5);
    }
}
