//! Configuration for remote extraction.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where and how to fetch remote problem sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Structured query endpoint.
    pub graphql_url: String,

    /// Base URL that public pages hang off.
    pub site_base_url: String,

    /// User-Agent sent with page requests.
    pub user_agent: String,

    /// Page size for tag and company queries.
    pub page_size: usize,

    /// Maximum number of problems taken from a link scrape.
    pub link_scrape_cap: usize,

    /// Hosts accepted as import sources.
    pub recognized_hosts: Vec<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl FetchConfig {
    /// Point both endpoints at another site, e.g. a mock server.
    pub fn with_site(mut self, base_url: impl Into<String>) -> Self {
        let base = base_url.into().trim_end_matches('/').to_string();
        self.graphql_url = format!("{base}/graphql/");
        self.site_base_url = base;
        self
    }

    /// Set the structured query endpoint.
    pub fn with_graphql_url(mut self, url: impl Into<String>) -> Self {
        self.graphql_url = url.into();
        self
    }

    /// Set the link scrape cap.
    pub fn with_link_scrape_cap(mut self, cap: usize) -> Self {
        self.link_scrape_cap = cap;
        self
    }

    /// Accept an additional host.
    pub fn with_recognized_host(mut self, host: impl Into<String>) -> Self {
        self.recognized_hosts.push(host.into());
        self
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            graphql_url: "https://leetcode.com/graphql/".to_string(),
            site_base_url: "https://leetcode.com".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            page_size: 100,
            link_scrape_cap: 100,
            recognized_hosts: vec![
                "leetcode.com".to_string(),
                "www.leetcode.com".to_string(),
                "leetcode.cn".to_string(),
                "www.leetcode.cn".to_string(),
            ],
            timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_with_site_rewrites_both_endpoints() {
        let config = FetchConfig::default().with_site("http://127.0.0.1:9000/");
        assert_eq!(config.site_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.graphql_url, "http://127.0.0.1:9000/graphql/");
    }

    #[test]
    fn test_defaults_and_overrides() {
        let config = FetchConfig::default();
        assert_eq!(config.link_scrape_cap, 100);
        assert_eq!(config.page_size, 100);

        let config = config
            .with_site("https://leetcode.cn")
            .with_graphql_url("https://leetcode.com/graphql/");
        assert_eq!(config.site_base_url, "https://leetcode.cn");
        assert_eq!(config.graphql_url, "https://leetcode.com/graphql/");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: FetchConfig = serde_json::from_str(r#"{"link_scrape_cap": 10}"#).unwrap();
        assert_eq!(config.link_scrape_cap, 10);
        assert_eq!(config.page_size, 100);
        assert_eq!(config.recognized_hosts.len(), 4);
    }
}
