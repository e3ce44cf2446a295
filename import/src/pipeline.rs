//! URL import pipeline.
//!
//! validate ─► extract ─► create (import mode) ─► populate
//!
//! Nothing is written to the store until extraction has produced problems.

use std::sync::Arc;

use problist_fetch::{Classified, ExtractionChain, FetchConfig, classify, is_recognized_host};
use problist_store::{Collection, CollectionStore, CollectionUpdate, CreateMode};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{ImportError, Result};

/// Imports remote collections into a [`CollectionStore`].
pub struct ImportPipeline {
    store: Arc<CollectionStore>,
    chain: ExtractionChain,
}

impl ImportPipeline {
    /// Create a pipeline writing to `store`.
    pub fn new(store: Arc<CollectionStore>, chain: ExtractionChain) -> Self {
        Self { store, chain }
    }

    /// Create a pipeline fetching over HTTP.
    pub fn from_config(store: Arc<CollectionStore>, config: FetchConfig) -> Result<Self> {
        Ok(Self::new(store, ExtractionChain::from_config(config)?))
    }

    /// The store imports are written to.
    pub fn store(&self) -> &Arc<CollectionStore> {
        &self.store
    }

    /// Check that `url` names an importable collection on a recognized host.
    pub fn validate(&self, url: &str) -> Result<Classified> {
        if url.is_empty() {
            return Err(ImportError::Validation("URL cannot be empty".to_string()));
        }
        if !is_recognized_host(url, &self.chain.config().recognized_hosts) {
            return Err(ImportError::Validation(format!("unsupported site in {url}")));
        }
        classify(url).ok_or_else(|| {
            ImportError::Validation(format!(
                "{url} is not a study plan, problem list, tag or company page"
            ))
        })
    }

    /// Import `url` as a new collection, named `custom_name` when given.
    pub async fn import_from_url(
        &self,
        url: &str,
        custom_name: Option<&str>,
    ) -> Result<Collection> {
        self.import_with_cancel(url, custom_name, &CancellationToken::new())
            .await
    }

    /// Like [`import_from_url`](Self::import_from_url), checking `cancel`
    /// between phases. In-flight requests are not interrupted.
    pub async fn import_with_cancel(
        &self,
        url: &str,
        custom_name: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Collection> {
        let url = url.trim();
        let classified = self.validate(url)?;
        ensure_active(cancel)?;

        let extraction = self
            .chain
            .extract(classified.kind, &classified.slug)
            .await?;
        ensure_active(cancel)?;

        let name = custom_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .or(extraction.name)
            .unwrap_or(classified.derived_name);

        let created = self
            .store
            .create_with_mode(
                &name,
                Some(format!("Imported from {url}")),
                Some(url.to_string()),
                CreateMode::Import,
            )
            .await?;

        let mut update = CollectionUpdate::new().with_problems(extraction.problems);
        if let Some(categories) = extraction.categories {
            update = update.with_categories(categories);
        }

        match self.store.update(&created.id, update).await {
            Ok(collection) => {
                info!(
                    "Imported {} problems into {} ({}) via {}",
                    collection.problems.len(),
                    collection.name,
                    collection.id,
                    extraction.stage
                );
                Ok(collection)
            }
            Err(e) => {
                if let Err(cleanup) = self.store.delete(&created.id).await {
                    warn!("Failed to remove partial import {}: {cleanup}", created.id);
                }
                Err(e.into())
            }
        }
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        info!("Import cancelled");
        return Err(ImportError::Cancelled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use problist_fetch::{CollectionKind, RequestOptions, Transport, TransportResponse};
    use problist_store::{CollectionBackend, MemoryBackend, StorageError, StoreError};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn pipeline() -> ImportPipeline {
        let store = Arc::new(CollectionStore::open(Arc::new(MemoryBackend::new())).await);
        let chain = ExtractionChain::from_config(FetchConfig::default()).unwrap();
        ImportPipeline::new(store, chain)
    }

    /// Answers every request with one problem-list query result.
    struct OneProblemTransport;

    #[async_trait]
    impl Transport for OneProblemTransport {
        async fn request(
            &self,
            _url: &str,
            _options: RequestOptions,
        ) -> problist_fetch::Result<TransportResponse> {
            let body = json!({"data": {"favoriteQuestionList": {"questions": [
                {"questionFrontendId": "1", "title": "Two Sum", "titleSlug": "two-sum"}
            ]}}});
            Ok(TransportResponse::new(200, body.to_string()))
        }
    }

    /// Fails only the `fail_on`-th save (1-based).
    struct FailingSave {
        inner: MemoryBackend,
        fail_on: usize,
        saves: AtomicUsize,
    }

    #[async_trait]
    impl CollectionBackend for FailingSave {
        async fn load_all(&self) -> std::result::Result<Vec<Collection>, StorageError> {
            self.inner.load_all().await
        }

        async fn save_all(
            &self,
            collections: &[Collection],
        ) -> std::result::Result<(), StorageError> {
            if self.saves.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
                return Err(StorageError::WriteFile("disk full".to_string()));
            }
            self.inner.save_all(collections).await
        }
    }

    #[tokio::test]
    async fn test_validate_accepts_known_site() {
        let classified = pipeline()
            .await
            .validate("https://leetcode.cn/studyplan/top-100-liked/")
            .unwrap();
        assert_eq!(classified.kind, CollectionKind::StudyPlan);
        assert_eq!(classified.derived_name, "Top 100 Liked");
    }

    #[tokio::test]
    async fn test_validate_rejects_unknown_site_and_path() {
        let pipeline = pipeline().await;
        for url in [
            "",
            "https://example.com/studyplan/top-100-liked/",
            "https://leetcode.com/problems/two-sum/",
            "not a url",
        ] {
            assert!(
                matches!(pipeline.validate(url), Err(ImportError::Validation(_))),
                "{url}"
            );
        }
    }

    #[tokio::test]
    async fn test_cancelled_before_extraction_creates_nothing() {
        let pipeline = pipeline().await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = pipeline
            .import_with_cancel("https://leetcode.com/tag/array/", None, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ImportError::Cancelled));
        assert!(pipeline.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_failed_populate_removes_new_collection() {
        let backend = Arc::new(FailingSave {
            inner: MemoryBackend::new(),
            fail_on: 2,
            saves: AtomicUsize::new(0),
        });
        let store = Arc::new(CollectionStore::open(backend.clone()).await);
        let transport = Arc::new(OneProblemTransport);
        let config = FetchConfig::default();
        let chain = ExtractionChain::new(transport, config).unwrap();
        let pipeline = ImportPipeline::new(store, chain);

        let err = pipeline
            .import_from_url("https://leetcode.com/problem-list/abc/", None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ImportError::Store(StoreError::Storage(StorageError::WriteFile(_)))
        ));
        assert!(pipeline.store().is_empty().await);
        assert!(CollectionStore::open(backend).await.is_empty().await);
    }
}
