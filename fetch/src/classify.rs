//! URL classification.
//!
//! Maps a URL onto the kind of remote collection it denotes. Host checks are
//! separate: classification looks only at the path.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// Kind of remote collection a URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionKind {
    /// A study plan with named sub-groups.
    StudyPlan,
    /// A favorites-style problem list.
    ProblemList,
    /// Problems filtered by topic tag.
    Tag,
    /// Problems filtered by company.
    Company,
}

impl CollectionKind {
    /// Every kind, in the order paths are matched.
    pub const ALL: [CollectionKind; 4] = [
        CollectionKind::StudyPlan,
        CollectionKind::ProblemList,
        CollectionKind::Tag,
        CollectionKind::Company,
    ];

    /// Path segment that introduces the slug.
    pub fn path_segment(self) -> &'static str {
        match self {
            CollectionKind::StudyPlan => "studyplan",
            CollectionKind::ProblemList => "problem-list",
            CollectionKind::Tag => "tag",
            CollectionKind::Company => "company",
        }
    }

    /// Stable name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKind::StudyPlan => "studyPlan",
            CollectionKind::ProblemList => "problemList",
            CollectionKind::Tag => "tag",
            CollectionKind::Company => "company",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recognized remote collection URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    /// Kind of collection.
    pub kind: CollectionKind,

    /// Slug identifying the collection within its kind.
    pub slug: String,

    /// Default display name derived from the slug.
    pub derived_name: String,
}

/// Classify a URL by its path. Returns `None` when the URL is malformed or
/// its path matches no known collection pattern.
pub fn classify(url: &str) -> Option<Classified> {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!("Failed to parse URL {url}: {e}");
            return None;
        }
    };

    let segments: Vec<&str> = parsed.path_segments()?.collect();

    CollectionKind::ALL.into_iter().find_map(|kind| {
        let slug = segments
            .windows(2)
            .find(|pair| pair[0] == kind.path_segment() && !pair[1].is_empty())
            .map(|pair| pair[1])?;

        Some(Classified {
            kind,
            slug: slug.to_string(),
            derived_name: humanize_slug(slug),
        })
    })
}

/// Turn `top-100-liked` into `Top 100 Liked`.
pub fn humanize_slug(slug: &str) -> String {
    slug.replace('-', " ")
        .split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whether the URL's host is one of `hosts` (compared case-insensitively).
pub fn is_recognized_host(url: &str, hosts: &[String]) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    parsed.host_str().is_some_and(|host| {
        hosts
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(host))
    })
}

/// Whether the URL has a recognized host and a classifiable path.
pub fn is_supported_url(url: &str, hosts: &[String]) -> bool {
    is_recognized_host(url, hosts) && classify(url).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hosts() -> Vec<String> {
        vec!["leetcode.com".to_string(), "leetcode.cn".to_string()]
    }

    #[test]
    fn test_classify_study_plan() {
        let classified = classify("https://example.com/studyplan/top-100-liked/").unwrap();
        assert_eq!(
            classified,
            Classified {
                kind: CollectionKind::StudyPlan,
                slug: "top-100-liked".to_string(),
                derived_name: "Top 100 Liked".to_string(),
            }
        );
    }

    #[test]
    fn test_classify_each_kind() {
        let cases = [
            (
                "https://leetcode.com/problem-list/2cktkvj/",
                CollectionKind::ProblemList,
                "2cktkvj",
            ),
            (
                "https://leetcode.com/tag/dynamic-programming",
                CollectionKind::Tag,
                "dynamic-programming",
            ),
            (
                "https://leetcode.cn/company/bytedance/?tab=all",
                CollectionKind::Company,
                "bytedance",
            ),
            (
                "https://leetcode.cn/zh/studyplan/leetcode-75/",
                CollectionKind::StudyPlan,
                "leetcode-75",
            ),
        ];
        for (url, kind, slug) in cases {
            let classified = classify(url).unwrap();
            assert_eq!(classified.kind, kind, "{url}");
            assert_eq!(classified.slug, slug, "{url}");
        }
    }

    #[test]
    fn test_classify_rejects_unknown_paths() {
        assert_eq!(classify("https://example.com/unrelated/path/"), None);
        assert_eq!(classify("https://example.com/studyplan/"), None);
        assert_eq!(classify("not a url"), None);
    }

    #[test]
    fn test_classify_ignores_host() {
        assert!(classify("https://elsewhere.org/tag/array/").is_some());
    }

    #[test]
    fn test_humanize_slug() {
        assert_eq!(humanize_slug("binary-search"), "Binary Search");
        assert_eq!(humanize_slug("leetcode-75"), "Leetcode 75");
    }

    #[test]
    fn test_host_recognition() {
        assert!(is_recognized_host("https://LeetCode.com/tag/array/", &hosts()));
        assert!(!is_recognized_host("https://example.com/tag/array/", &hosts()));
        assert!(!is_recognized_host("garbage", &hosts()));
    }

    #[test]
    fn test_supported_url_needs_host_and_path() {
        assert!(is_supported_url("https://leetcode.cn/studyplan/top-100-liked/", &hosts()));
        assert!(!is_supported_url("https://leetcode.cn/problems/two-sum/", &hosts()));
        assert!(!is_supported_url("https://example.com/studyplan/top-100-liked/", &hosts()));
    }

    #[test]
    fn test_kind_serializes_camel_case() {
        let json = serde_json::to_string(&CollectionKind::StudyPlan).unwrap();
        assert_eq!(json, "\"studyPlan\"");
    }
}
