//! Fallback extraction driver.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::classify::CollectionKind;
use crate::config::FetchConfig;
use crate::error::{ExtractionFailure, Result, StageFailure};
use crate::normalize::dedupe;
use crate::strategy::{self, Extraction, Scraper, Stage, StageResult};
use crate::transport::{HttpTransport, Transport};

type PageCell = OnceCell<std::result::Result<String, StageFailure>>;

/// Runs extraction stages in order until one yields problems.
///
/// The public page is fetched at most once per [`extract`](Self::extract)
/// call and shared by the page-state and link-scrape stages.
pub struct ExtractionChain {
    transport: Arc<dyn Transport>,
    config: FetchConfig,
    stages: Vec<Stage>,
    scraper: Scraper,
}

impl ExtractionChain {
    /// Create a chain running every stage over `transport`.
    pub fn new(transport: Arc<dyn Transport>, config: FetchConfig) -> Result<Self> {
        Ok(Self {
            transport,
            config,
            stages: Stage::ALL.to_vec(),
            scraper: Scraper::new()?,
        })
    }

    /// Create a chain over HTTP using the configured timeout.
    pub fn from_config(config: FetchConfig) -> Result<Self> {
        let transport = HttpTransport::with_timeout(config.timeout())?;
        Self::new(Arc::new(transport), config)
    }

    /// Replace the stage order.
    pub fn with_stages(mut self, stages: impl IntoIterator<Item = Stage>) -> Self {
        self.stages = stages.into_iter().collect();
        self
    }

    /// Stages in the order they run.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Active configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Extract the problems of a remote collection.
    ///
    /// Returns the first non-empty stage result with duplicate ids removed,
    /// or [`FetchError::Extraction`](crate::FetchError::Extraction) when
    /// every stage comes up empty.
    pub async fn extract(&self, kind: CollectionKind, slug: &str) -> Result<Extraction> {
        info!("Extracting {kind} \"{slug}\"");

        let page = PageCell::new();
        let mut failures = Vec::with_capacity(self.stages.len());

        for &stage in &self.stages {
            match self.run(stage, kind, slug, &page).await {
                Ok(mut extraction) => {
                    extraction.problems = dedupe(extraction.problems);
                    info!(
                        "{stage} found {} problems for {kind} \"{slug}\"",
                        extraction.problems.len()
                    );
                    return Ok(extraction);
                }
                Err(failure) => {
                    warn!("{stage} failed for {kind} \"{slug}\": {failure}");
                    failures.push((stage, failure));
                }
            }
        }

        let reason = |wanted: Stage| {
            failures
                .iter()
                .find(|(stage, _)| *stage == wanted)
                .map(|(_, failure)| failure.to_string())
                .unwrap_or_else(|| StageFailure::Skipped.to_string())
        };

        Err(ExtractionFailure {
            kind,
            slug: slug.to_string(),
            structured: reason(Stage::StructuredQuery),
            page_state: reason(Stage::PageState),
        }
        .into())
    }

    async fn run(
        &self,
        stage: Stage,
        kind: CollectionKind,
        slug: &str,
        page: &PageCell,
    ) -> StageResult {
        match stage {
            Stage::StructuredQuery => {
                strategy::structured_query(self.transport.as_ref(), &self.config, kind, slug).await
            }
            Stage::PageState => {
                let html = self.page(page, kind, slug).await?;
                self.scraper.page_state(html, kind)
            }
            Stage::LinkScrape => {
                let html = self.page(page, kind, slug).await?;
                self.scraper.link_scrape(html, self.config.link_scrape_cap)
            }
        }
    }

    async fn page<'a>(
        &self,
        cell: &'a PageCell,
        kind: CollectionKind,
        slug: &str,
    ) -> std::result::Result<&'a str, StageFailure> {
        cell.get_or_init(|| {
            strategy::fetch_page(self.transport.as_ref(), &self.config, kind, slug)
        })
        .await
        .as_deref()
        .map_err(Clone::clone)
    }
}
