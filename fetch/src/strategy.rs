//! The extraction stages.
//!
//! Each stage turns a `(kind, slug)` into an [`Extraction`] or a
//! [`StageFailure`]. A stage that finds no problems fails with
//! [`StageFailure::Empty`].

use std::collections::HashSet;
use std::fmt;

use problist_store::{Category, Problem};
use regex_lite::Regex;
use serde_json::{Value, json};
use tracing::debug;

use crate::classify::{CollectionKind, humanize_slug};
use crate::config::FetchConfig;
use crate::error::{Result, StageFailure};
use crate::normalize::{Dialect, text};
use crate::transport::{RequestOptions, Transport};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

const STUDY_PLAN_QUERY: &str = "
    query studyPlanV2Detail($slug: String!) {
        studyPlanV2Detail(planSlug: $slug) {
            name
            slug
            description
            planSubGroups {
                slug
                name
                questions {
                    translatedTitle
                    titleSlug
                    difficulty
                    questionId
                    questionFrontendId
                    title
                }
            }
        }
    }";

const FAVORITE_QUERY: &str = "
    query favoriteQuestionList($favoriteSlug: String!) {
        favoriteQuestionList(favoriteSlug: $favoriteSlug) {
            questions {
                difficulty
                id
                questionFrontendId
                title
                titleSlug
                translatedTitle
            }
        }
    }";

const PROBLEMSET_QUERY: &str = "
    query problemsetQuestionList(
        $categorySlug: String!, $limit: Int, $skip: Int, $filters: QuestionListFilterInput!
    ) {
        problemsetQuestionList(
            categorySlug: $categorySlug, limit: $limit, skip: $skip, filters: $filters
        ) {
            questions {
                translatedTitle
                titleSlug
                difficulty
                questionId
                questionFrontendId
                title
            }
        }
    }";

/// Top-level keys searched in `window.__INITIAL_STATE__`.
const INITIAL_STATE_KEYS: [&str; 7] = [
    "studyplan",
    "studyPlan",
    "plan",
    "questions",
    "problemList",
    "favoriteQuestionList",
    "favoriteList",
];

/// One step of the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// POST a structured query to the query endpoint.
    StructuredQuery,
    /// Parse data embedded in the public page.
    PageState,
    /// Collect problem links from the public page.
    LinkScrape,
}

impl Stage {
    /// Every stage, in fallback order.
    pub const ALL: [Stage; 3] = [Stage::StructuredQuery, Stage::PageState, Stage::LinkScrape];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::StructuredQuery => "structured query",
            Stage::PageState => "page state",
            Stage::LinkScrape => "link scrape",
        })
    }
}

/// Problems recovered by a stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Stage that produced the result.
    pub stage: Stage,

    /// Flat problem list.
    pub problems: Vec<Problem>,

    /// Remote grouping, when the source has one.
    pub categories: Option<Vec<Category>>,

    /// Name the source gives itself, if any.
    pub name: Option<String>,
}

impl Extraction {
    fn new(stage: Stage, problems: Vec<Problem>) -> Self {
        Self {
            stage,
            problems,
            categories: None,
            name: None,
        }
    }

    fn non_empty(self) -> StageResult {
        if self.problems.is_empty() {
            Err(StageFailure::Empty)
        } else {
            Ok(self)
        }
    }
}

/// Outcome of one stage.
pub type StageResult = std::result::Result<Extraction, StageFailure>;

/// Map a collection node: an array of records, an object with `questions`,
/// or an object with `planSubGroups`, checked in that order.
fn from_node(node: &Value, dialect: Dialect, stage: Stage) -> Extraction {
    let name = text(&node["name"]);
    let mut extraction = if node.is_array() {
        Extraction::new(stage, dialect.flat(node))
    } else if node["questions"].is_array() {
        Extraction::new(stage, dialect.flat(&node["questions"]))
    } else if node["planSubGroups"].is_array() {
        let (problems, categories) = dialect.grouped(&node["planSubGroups"]);
        let mut extraction = Extraction::new(stage, problems);
        extraction.categories = Some(categories);
        extraction
    } else {
        Extraction::new(stage, Vec::new())
    };
    extraction.name = name;
    extraction
}

/// Response key holding the collection for a kind.
fn data_key(kind: CollectionKind) -> &'static str {
    match kind {
        CollectionKind::StudyPlan => "studyPlanV2Detail",
        CollectionKind::ProblemList => "favoriteQuestionList",
        CollectionKind::Tag | CollectionKind::Company => "problemsetQuestionList",
    }
}

fn query_body(kind: CollectionKind, slug: &str, page_size: usize) -> Value {
    match kind {
        CollectionKind::StudyPlan => json!({
            "query": STUDY_PLAN_QUERY,
            "variables": { "slug": slug },
        }),
        CollectionKind::ProblemList => json!({
            "query": FAVORITE_QUERY,
            "variables": { "favoriteSlug": slug },
        }),
        CollectionKind::Tag => json!({
            "query": PROBLEMSET_QUERY,
            "variables": {
                "categorySlug": "",
                "limit": page_size,
                "skip": 0,
                "filters": { "tags": [slug] },
            },
        }),
        CollectionKind::Company => json!({
            "query": PROBLEMSET_QUERY,
            "variables": {
                "categorySlug": "",
                "limit": page_size,
                "skip": 0,
                "filters": { "companyTags": [slug] },
            },
        }),
    }
}

/// Public page for a collection.
pub(crate) fn page_url(config: &FetchConfig, kind: CollectionKind, slug: &str) -> String {
    format!(
        "{}/{}/{slug}/",
        config.site_base_url.trim_end_matches('/'),
        kind.path_segment()
    )
}

/// Stage 1: ask the query endpoint.
pub(crate) async fn structured_query(
    transport: &dyn Transport,
    config: &FetchConfig,
    kind: CollectionKind,
    slug: &str,
) -> StageResult {
    let body = query_body(kind, slug, config.page_size);
    let response = transport
        .request(&config.graphql_url, RequestOptions::post_json(body))
        .await
        .map_err(|e| StageFailure::Request(e.to_string()))?;

    if !response.is_success() {
        return Err(StageFailure::Status(response.status));
    }

    let value = response
        .json()
        .map_err(|e| StageFailure::Shape(format!("response is not JSON: {e}")))?;

    if let Some(first) = value["errors"].as_array().and_then(|errors| errors.first()) {
        let message = first["message"].as_str().unwrap_or("unknown error");
        return Err(StageFailure::Remote(message.to_string()));
    }

    let key = data_key(kind);
    let node = &value["data"][key];
    if node.is_null() {
        return Err(StageFailure::Shape(format!("no {key} in response")));
    }

    from_node(node, Dialect::Structured, Stage::StructuredQuery).non_empty()
}

/// Fetch the public page shared by the scraping stages.
pub(crate) async fn fetch_page(
    transport: &dyn Transport,
    config: &FetchConfig,
    kind: CollectionKind,
    slug: &str,
) -> std::result::Result<String, StageFailure> {
    let url = page_url(config, kind, slug);
    let options = RequestOptions::get()
        .with_header("Accept", ACCEPT_HTML)
        .with_header("User-Agent", config.user_agent.clone());

    let response = transport
        .request(&url, options)
        .await
        .map_err(|e| StageFailure::Request(e.to_string()))?;

    if !response.is_success() {
        return Err(StageFailure::Status(response.status));
    }

    debug!("Fetched {url} ({} bytes)", response.body.len());
    Ok(response.body)
}

/// Compiled page-scraping patterns.
#[derive(Debug, Clone)]
pub(crate) struct Scraper {
    next_data: Regex,
    initial_state: Regex,
    problem_link: Regex,
}

impl Scraper {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            next_data: Regex::new(r#"(?s)<script[^>]*id="__NEXT_DATA__"[^>]*>(.*?)</script>"#)?,
            initial_state: Regex::new(
                r"(?s)<script[^>]*>.*?window\.__INITIAL_STATE__\s*=\s*(\{.*?\});.*?</script>",
            )?,
            problem_link: Regex::new(r#"href="(?:https?://[^/"]+)?/problems/([^"/?#]+)[^"]*""#)?,
        })
    }

    /// Stage 2: parse `__NEXT_DATA__`, then `window.__INITIAL_STATE__`.
    pub(crate) fn page_state(&self, html: &str, kind: CollectionKind) -> StageResult {
        let mut reasons = Vec::new();

        if let Some(blob) = capture(&self.next_data, html) {
            match serde_json::from_str::<Value>(blob.trim()) {
                Ok(value) => match from_next_data(&value, kind) {
                    Some(extraction) => return Ok(extraction),
                    None => reasons.push("__NEXT_DATA__ holds no questions".to_string()),
                },
                Err(e) => reasons.push(format!("__NEXT_DATA__ is not JSON: {e}")),
            }
        }

        if let Some(blob) = capture(&self.initial_state, html) {
            match serde_json::from_str::<Value>(blob) {
                Ok(value) => match from_initial_state(&value) {
                    Some(extraction) => return Ok(extraction),
                    None => reasons.push("__INITIAL_STATE__ holds no questions".to_string()),
                },
                Err(e) => reasons.push(format!("__INITIAL_STATE__ is not JSON: {e}")),
            }
        }

        if reasons.is_empty() {
            Err(StageFailure::Shape("no embedded page state".to_string()))
        } else {
            Err(StageFailure::Shape(reasons.join("; ")))
        }
    }

    /// Stage 3: collect distinct `/problems/<slug>` links, in page order.
    pub(crate) fn link_scrape(&self, html: &str, cap: usize) -> StageResult {
        let mut seen = HashSet::new();
        let problems = self
            .problem_link
            .captures_iter(html)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .filter(|slug| seen.insert(*slug))
            .take(cap)
            .enumerate()
            .map(|(i, slug)| {
                Problem::new((i + 1).to_string(), humanize_slug(slug))
                    .with_slug(slug)
                    .with_difficulty("Medium")
            })
            .collect();

        Extraction::new(Stage::LinkScrape, problems).non_empty()
    }
}

fn capture<'h>(pattern: &Regex, html: &'h str) -> Option<&'h str> {
    pattern
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn from_next_data(value: &Value, kind: CollectionKind) -> Option<Extraction> {
    let key = data_key(kind);
    value
        .pointer("/props/pageProps/dehydratedState/queries")?
        .as_array()?
        .iter()
        .filter_map(|query| query.pointer("/state/data")?.get(key))
        .map(|node| from_node(node, Dialect::Structured, Stage::PageState))
        .find(|extraction| !extraction.problems.is_empty())
}

fn from_initial_state(value: &Value) -> Option<Extraction> {
    INITIAL_STATE_KEYS
        .iter()
        .filter_map(|key| value.get(*key))
        .map(|node| from_node(node, Dialect::PageState, Stage::PageState))
        .find(|extraction| !extraction.problems.is_empty())
}
