//! Mapping remote question records onto [`Problem`]s.
//!
//! Two dialects exist. Structured records (query responses and the
//! `__NEXT_DATA__` blob) skip records without any id and lowercase the
//! difficulty. Page-state records (`__INITIAL_STATE__`) synthesize missing
//! fields from the record position and keep the difficulty verbatim.

use std::collections::HashSet;

use problist_store::{Category, Problem};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A question record in any of the remote shapes. Ids may arrive as strings
/// or numbers; empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawQuestion {
    #[serde(deserialize_with = "lenient")]
    pub question_frontend_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub question_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub translated_title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub title_slug: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub slug: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub difficulty: Option<String>,
}

fn lenient<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Records of a JSON array; entries that are not objects are skipped.
pub(crate) fn questions(value: &Value) -> Vec<RawQuestion> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Map a structured record. `None` when the record carries no id at all.
pub(crate) fn structured_problem(raw: &RawQuestion) -> Option<Problem> {
    let id = raw
        .question_frontend_id
        .clone()
        .or_else(|| raw.id.clone())
        .or_else(|| raw.question_id.clone())?;
    let question_id = raw
        .question_id
        .clone()
        .or_else(|| raw.id.clone())
        .unwrap_or_else(|| id.clone());
    let title = raw
        .translated_title
        .clone()
        .or_else(|| raw.title.clone())
        .unwrap_or_else(|| format!("Problem {id}"));
    let difficulty = raw
        .difficulty
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_else(|| "medium".to_string());

    Some(Problem {
        frontend_id: id.clone(),
        question_id,
        title,
        title_slug: raw.title_slug.clone().unwrap_or_default(),
        difficulty,
        id,
    })
}

/// Map a page-state record at zero-based `index` of its list.
pub(crate) fn page_state_problem(raw: &RawQuestion, index: usize) -> Problem {
    let n = index + 1;
    let id = raw
        .question_frontend_id
        .clone()
        .or_else(|| raw.question_id.clone())
        .or_else(|| raw.id.clone())
        .unwrap_or_else(|| n.to_string());
    let title = raw
        .translated_title
        .clone()
        .or_else(|| raw.title.clone())
        .or_else(|| raw.name.clone())
        .unwrap_or_else(|| format!("Problem {n}"));
    let title_slug = raw
        .title_slug
        .clone()
        .or_else(|| raw.slug.clone())
        .unwrap_or_else(|| format!("problem-{n}"));

    Problem {
        frontend_id: id.clone(),
        question_id: raw.question_id.clone().unwrap_or_else(|| id.clone()),
        title,
        title_slug,
        difficulty: raw
            .difficulty
            .clone()
            .unwrap_or_else(|| "Medium".to_string()),
        id,
    }
}

/// Which record dialect to map with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dialect {
    Structured,
    PageState,
}

impl Dialect {
    fn map(self, records: &[RawQuestion], offset: usize) -> Vec<Problem> {
        match self {
            Dialect::Structured => records.iter().filter_map(structured_problem).collect(),
            Dialect::PageState => records
                .iter()
                .enumerate()
                .map(|(i, raw)| page_state_problem(raw, offset + i))
                .collect(),
        }
    }

    /// Map a flat array of records.
    pub(crate) fn flat(self, value: &Value) -> Vec<Problem> {
        self.map(&questions(value), 0)
    }

    /// Map an array of groups, each with `name`, `slug` and `questions`.
    ///
    /// The flat list is every group's problems in order. Positions used for
    /// synthesized page-state fields run across groups, so a category entry
    /// always matches its flat-list counterpart.
    pub(crate) fn grouped(self, groups: &Value) -> (Vec<Problem>, Vec<Category>) {
        let mut problems = Vec::new();
        let mut categories = Vec::new();
        let mut offset = 0;

        for (i, group) in groups.as_array().into_iter().flatten().enumerate() {
            let records = questions(&group["questions"]);
            let mapped = self.map(&records, offset);
            offset += records.len();

            let name = text(&group["name"]);
            let slug = text(&group["slug"])
                .or_else(|| name.clone())
                .unwrap_or_else(|| format!("group-{}", i + 1));
            let name = name.unwrap_or_else(|| slug.clone());

            problems.extend(mapped.iter().cloned());
            categories.push(Category::new(name, slug).with_problems(mapped));
        }

        (problems, categories)
    }
}

/// Non-empty string at `value`.
pub(crate) fn text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Keep the first problem for each id.
pub(crate) fn dedupe(problems: Vec<Problem>) -> Vec<Problem> {
    let mut seen = HashSet::new();
    problems
        .into_iter()
        .filter(|p| seen.insert(p.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn raw(value: Value) -> RawQuestion {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_structured_prefers_frontend_id_and_translated_title() {
        let problem = structured_problem(&raw(json!({
            "questionFrontendId": "1",
            "questionId": 1001,
            "title": "Two Sum",
            "translatedTitle": "两数之和",
            "titleSlug": "two-sum",
            "difficulty": "EASY"
        })))
        .unwrap();

        assert_eq!(problem.id, "1");
        assert_eq!(problem.frontend_id, "1");
        assert_eq!(problem.question_id, "1001");
        assert_eq!(problem.title, "两数之和");
        assert_eq!(problem.difficulty, "easy");
    }

    #[test]
    fn test_structured_numeric_id_and_defaults() {
        let problem = structured_problem(&raw(json!({"id": 42, "title": "X"}))).unwrap();
        assert_eq!(problem.id, "42");
        assert_eq!(problem.question_id, "42");
        assert_eq!(problem.difficulty, "medium");
        assert_eq!(problem.title_slug, "");
    }

    #[test]
    fn test_structured_skips_records_without_id() {
        assert_eq!(
            structured_problem(&raw(json!({"title": "x", "questionFrontendId": ""}))),
            None
        );
    }

    #[test]
    fn test_page_state_synthesizes_from_position() {
        let problem = page_state_problem(&RawQuestion::default(), 2);
        assert_eq!(problem.id, "3");
        assert_eq!(problem.title, "Problem 3");
        assert_eq!(problem.title_slug, "problem-3");
        assert_eq!(problem.difficulty, "Medium");
    }

    #[test]
    fn test_page_state_keeps_difficulty_verbatim() {
        let problem = page_state_problem(
            &raw(json!({"questionId": "7", "name": "Reverse", "slug": "reverse", "difficulty": "HARD"})),
            0,
        );
        assert_eq!(problem.id, "7");
        assert_eq!(problem.title, "Reverse");
        assert_eq!(problem.title_slug, "reverse");
        assert_eq!(problem.difficulty, "HARD");
    }

    #[test]
    fn test_grouped_builds_categories_and_flat_list() {
        let groups = json!([
            {"name": "Hashing", "slug": "hashing", "questions": [{"questionFrontendId": "1", "title": "A"}]},
            {"name": "Two Pointers", "questions": [{"questionFrontendId": "2", "title": "B"}, "junk"]}
        ]);

        let (problems, categories) = Dialect::Structured.grouped(&groups);

        assert_eq!(problems.len(), 2);
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].id, "category_hashing");
        assert_eq!(categories[1].slug, "Two Pointers");
        assert_eq!(categories[1].problems[0].id, "2");
    }

    #[test]
    fn test_grouped_page_state_positions_run_across_groups() {
        let groups = json!([
            {"slug": "a", "questions": [{}]},
            {"slug": "b", "questions": [{}]}
        ]);

        let (problems, categories) = Dialect::PageState.grouped(&groups);

        assert_eq!(problems[1].id, "2");
        assert_eq!(categories[1].problems[0], problems[1]);
        assert_eq!(categories[0].name, "a");
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let problems = vec![
            Problem::new("1", "first"),
            Problem::new("2", "b"),
            Problem::new("1", "second"),
        ];
        let deduped = dedupe(problems);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].title, "first");
    }
}
