//! Core collection types.
//!
//! A collection is a named, user-facing group of problems, optionally
//! partitioned into categories that mirror a remote source's own grouping.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single externally-identified problem.
///
/// `id` is the identity used for equality and de-duplication. It holds the
/// frontend-facing number when one is known, otherwise the internal one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    /// Stable external identifier.
    pub id: String,

    /// Display title.
    pub title: String,

    /// URL slug of the problem page.
    #[serde(default)]
    pub title_slug: String,

    /// Difficulty label, casing preserved from the source that produced it.
    #[serde(default)]
    pub difficulty: String,

    /// Display numbering.
    #[serde(default)]
    pub frontend_id: String,

    /// Internal numbering.
    #[serde(default)]
    pub question_id: String,
}

impl Problem {
    /// Create a problem whose display and internal ids both equal `id`.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            frontend_id: id.clone(),
            question_id: id.clone(),
            id,
            title: title.into(),
            title_slug: String::new(),
            difficulty: String::new(),
        }
    }

    /// Set the title slug.
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.title_slug = slug.into();
        self
    }

    /// Set the difficulty label.
    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = difficulty.into();
        self
    }

    /// Set the internal question id.
    pub fn with_question_id(mut self, question_id: impl Into<String>) -> Self {
        self.question_id = question_id.into();
        self
    }

    /// Whether `key` names this problem by id or display number.
    pub fn matches(&self, key: &str) -> bool {
        self.id == key || (!self.frontend_id.is_empty() && self.frontend_id == key)
    }
}

/// A named sub-grouping of problems within a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Derived from the slug so re-imports land on the same category.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Remote grouping slug.
    pub slug: String,

    /// Problems in this category; always a subset of the owning flat list.
    #[serde(default)]
    pub problems: Vec<Problem>,
}

impl Category {
    /// Create an empty category for a remote grouping.
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            id: Self::id_for_slug(&slug),
            name: name.into(),
            slug,
            problems: Vec::new(),
        }
    }

    /// Set the category problems.
    pub fn with_problems(mut self, problems: Vec<Problem>) -> Self {
        self.problems = problems;
        self
    }

    /// Category id for a slug.
    pub fn id_for_slug(slug: &str) -> String {
        format!("category_{slug}")
    }

    /// Whether the category holds a problem with this id.
    pub fn contains(&self, problem_id: &str) -> bool {
        self.problems.iter().any(|p| p.id == problem_id)
    }
}

/// A named collection of problems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Unique, immutable identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Source URL for imported collections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Flat problem list; no two entries share an id.
    #[serde(default)]
    pub problems: Vec<Problem>,

    /// Optional categories referencing problems from the flat list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,

    /// Provenance: built-in official list rather than a user collection.
    #[serde(default)]
    pub is_official: bool,

    /// Creation time.
    pub created_at: DateTime<Utc>,

    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Collection {
    /// Create an empty collection stamped with `now`.
    pub fn new(id: impl Into<String>, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            url: None,
            problems: Vec::new(),
            categories: None,
            is_official: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the flat list holds a problem with this id.
    pub fn contains(&self, problem_id: &str) -> bool {
        self.problems.iter().any(|p| p.id == problem_id)
    }

    /// Whether the collection has at least one category.
    pub fn has_categories(&self) -> bool {
        self.categories.as_ref().is_some_and(|c| !c.is_empty())
    }

    /// Look up a category by id.
    pub fn category(&self, category_id: &str) -> Option<&Category> {
        self.categories
            .as_ref()
            .and_then(|cats| cats.iter().find(|c| c.id == category_id))
    }

    pub(crate) fn category_mut(&mut self, category_id: &str) -> Option<&mut Category> {
        self.categories
            .as_mut()
            .and_then(|cats| cats.iter_mut().find(|c| c.id == category_id))
    }

    /// Stamp the modification time, never moving it before creation.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    /// Drop duplicate ids from the flat list and category entries that are
    /// not in the flat list.
    pub(crate) fn normalize(&mut self) -> usize {
        let mut seen = HashSet::new();
        let before = self.problems.len();
        self.problems.retain(|p| seen.insert(p.id.clone()));
        let mut dropped = before - self.problems.len();

        if let Some(categories) = self.categories.as_mut() {
            for category in categories.iter_mut() {
                let before = category.problems.len();
                let mut in_category = HashSet::new();
                category
                    .problems
                    .retain(|p| seen.contains(&p.id) && in_category.insert(p.id.clone()));
                dropped += before - category.problems.len();
            }
        }
        dropped
    }
}

/// Partial update for a collection. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct CollectionUpdate {
    /// New name.
    pub name: Option<String>,

    /// New description.
    pub description: Option<String>,

    /// New source URL.
    pub url: Option<String>,

    /// Replacement flat list.
    pub problems: Option<Vec<Problem>>,

    /// Replacement categories; an empty list removes them.
    pub categories: Option<Vec<Category>>,

    /// New provenance flag.
    pub is_official: Option<bool>,
}

impl CollectionUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the source URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Replace the flat problem list.
    pub fn with_problems(mut self, problems: Vec<Problem>) -> Self {
        self.problems = Some(problems);
        self
    }

    /// Replace the categories.
    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = Some(categories);
        self
    }

    /// Set the provenance flag.
    pub fn official(mut self, is_official: bool) -> Self {
        self.is_official = Some(is_official);
        self
    }

    pub(crate) fn apply(self, collection: &mut Collection) {
        if let Some(name) = self.name {
            collection.name = name;
        }
        if let Some(description) = self.description {
            collection.description = Some(description);
        }
        if let Some(url) = self.url {
            collection.url = Some(url);
        }
        if let Some(problems) = self.problems {
            collection.problems = problems;
        }
        if let Some(categories) = self.categories {
            collection.categories = (!categories.is_empty()).then_some(categories);
        }
        if let Some(is_official) = self.is_official {
            collection.is_official = is_official;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_category_id_derived_from_slug() {
        let category = Category::new("Hashing", "hashing");
        assert_eq!(category.id, "category_hashing");
    }

    #[test]
    fn test_collection_serializes_camel_case() {
        let now = Utc::now();
        let mut collection = Collection::new("custom_1", "Graphs", now);
        collection
            .problems
            .push(Problem::new("200", "Number of Islands").with_slug("number-of-islands"));

        let json = serde_json::to_value(&collection).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("isOfficial").is_some());
        assert_eq!(json["problems"][0]["titleSlug"], "number-of-islands");
        assert!(json.get("categories").is_none());
    }

    #[test]
    fn test_normalize_enforces_invariants() {
        let now = Utc::now();
        let mut collection = Collection::new("c", "c", now);
        collection.problems = vec![
            Problem::new("1", "Two Sum"),
            Problem::new("1", "Two Sum again"),
            Problem::new("2", "Add Two Numbers"),
        ];
        collection.categories = Some(vec![Category::new("Arrays", "arrays").with_problems(vec![
            Problem::new("1", "Two Sum"),
            Problem::new("9", "Palindrome Number"),
        ])]);

        let dropped = collection.normalize();

        assert_eq!(dropped, 2);
        assert_eq!(collection.problems.len(), 2);
        assert_eq!(collection.problems[0].title, "Two Sum");
        let category = collection.category("category_arrays").unwrap();
        assert_eq!(category.problems.len(), 1);
    }

    #[test]
    fn test_problem_matches_id_or_display_number() {
        let mut problem = Problem::new("1", "Two Sum").with_question_id("1001");
        assert!(problem.matches("1"));
        assert!(!problem.matches("1001"));

        problem.id = "two-sum".to_string();
        assert!(problem.matches("1"));
        assert_eq!(serde_json::to_value(&problem).unwrap()["questionId"], "1001");
    }

    #[test]
    fn test_touch_never_precedes_creation() {
        let now = Utc::now();
        let mut collection = Collection::new("c", "c", now);
        collection.touch(now - chrono::Duration::seconds(30));
        assert_eq!(collection.updated_at, collection.created_at);
    }
}
