//! Built-in official problem lists.
//!
//! The catalog is static data: each entry names a curated list and the
//! display numbers of its problems.

use chrono::{DateTime, Utc};

use crate::model::{Collection, Problem};

/// One curated list in the catalog.
#[derive(Debug, Clone)]
pub struct OfficialList {
    /// Short key; the collection id is `official_<key>`.
    pub key: String,

    /// Display name.
    pub name: String,

    /// Description.
    pub description: String,

    /// Problem display numbers, in list order. May repeat.
    pub problem_ids: Vec<String>,
}

impl OfficialList {
    /// Create a catalog entry.
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        problem_ids: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            description: description.into(),
            problem_ids: problem_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Collection id for this entry.
    pub fn collection_id(&self) -> String {
        format!("official_{}", self.key)
    }

    /// Materialize as a collection stamped with `now`, repeated ids dropped.
    pub fn to_collection(&self, now: DateTime<Utc>) -> Collection {
        let mut collection = Collection::new(self.collection_id(), self.name.clone(), now);
        collection.description = Some(self.description.clone());
        collection.is_official = true;
        collection.problems = self
            .problem_ids
            .iter()
            .map(|id| Problem::new(id.clone(), format!("Problem {id}")))
            .collect();
        collection.normalize();
        collection
    }
}

/// The set of official lists kept in sync with the store.
#[derive(Debug, Clone, Default)]
pub struct OfficialCatalog {
    lists: Vec<OfficialList>,
}

impl OfficialCatalog {
    /// Create a catalog from explicit entries.
    pub fn new(lists: Vec<OfficialList>) -> Self {
        Self { lists }
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> Self {
        Self::new(vec![
            OfficialList::new(
                "hot100",
                "LeetCode Hot 100",
                "The most popular 100 problems on LeetCode",
                [
                    "1", "2", "3", "4", "5", "10", "11", "15", "17", "19", "20", "21", "22", "23",
                    "31", "32", "33", "34", "39", "42", "46", "48", "49", "53", "55", "56", "62",
                    "64", "70", "72", "75", "76", "78", "79", "84", "85", "94", "96", "98", "101",
                    "102", "104", "105", "114", "121", "124", "128", "136", "139", "141", "142",
                    "146", "148", "152", "155", "160", "169", "198", "200", "206", "207", "208",
                    "215", "221", "226", "234", "236", "238", "239", "240", "253", "279", "283",
                    "287", "297", "300", "301", "309", "312", "322", "337", "338", "347", "394",
                    "399", "406", "416", "437", "438", "448", "461", "494", "538", "543", "560",
                    "581", "617", "621", "647", "739", "763", "771", "773", "787", "797", "815",
                    "841", "853", "875", "909", "973", "994", "1046", "1143", "1249", "1312",
                    "1466", "1557", "1696", "1791",
                ],
            ),
            OfficialList::new(
                "top_interview_150",
                "Top Interview 150",
                "LeetCode's official top interview questions",
                (1..=150).map(|n: u32| n.to_string()),
            ),
            OfficialList::new(
                "leetcode_75",
                "LeetCode 75",
                "LeetCode's official 75 study plan",
                [
                    "1768", "1071", "1431", "605", "345", "151", "238", "334", "443", "283", "392",
                    "11", "1679", "643", "1456", "1732", "724", "2215", "205", "20", "155", "150",
                    "739", "239", "209", "3", "424", "567", "76", "242", "49", "347", "1", "202",
                    "128", "217", "36", "271", "659", "121", "409", "589", "102", "199", "637",
                    "429", "515", "116", "104", "226", "101", "572", "235", "98", "230", "105",
                    "106", "208", "211", "1254", "695", "200", "130", "323", "261", "1584", "743",
                    "787", "1971", "1466", "399", "207", "210", "684", "685", "547", "1319", "990",
                ],
            ),
            OfficialList::new(
                "dynamic_programming",
                "Dynamic Programming",
                "Essential dynamic programming problems",
                [
                    "70", "198", "213", "746", "121", "122", "123", "188", "309", "714", "53",
                    "918", "152", "1567", "1014", "1218", "873", "1025", "1269", "2320", "300",
                    "673", "674", "368", "646", "376", "334", "5", "647", "516", "1312", "1143",
                    "72", "97", "115", "583", "712", "322", "518", "377", "343", "279", "91",
                    "139", "140", "416", "1049", "494", "474", "879",
                ],
            ),
            OfficialList::new(
                "binary_search",
                "Binary Search",
                "Binary search and related problems",
                [
                    "704", "35", "34", "69", "367", "374", "278", "162", "153", "154", "33", "81",
                    "4", "240", "74", "167", "209", "875", "1011", "410", "1482", "1552", "1760",
                    "2187", "2226", "2300", "2439", "2528", "2560", "2616",
                ],
            ),
            OfficialList::new(
                "two_pointers",
                "Two Pointers",
                "Two pointers technique problems",
                [
                    "125", "680", "392", "167", "15", "16", "18", "11", "42", "633", "345", "88",
                    "283", "27", "26", "80", "75", "31", "556", "581", "611", "713", "977",
                    "1089", "1099", "1208", "1498", "1570", "1610",
                ],
            ),
            OfficialList::new(
                "sliding_window",
                "Sliding Window",
                "Sliding window technique problems",
                [
                    "3", "76", "209", "424", "438", "567", "713", "1004", "1208", "1493", "1838",
                    "1984", "2024", "2090", "2134", "2200", "2269", "2379", "2461", "2537",
                ],
            ),
            OfficialList::new(
                "tree_traversal",
                "Tree Traversal",
                "Tree traversal and manipulation problems",
                [
                    "94", "144", "145", "102", "107", "103", "199", "637", "429", "515", "116",
                    "117", "104", "111", "226", "101", "572", "100", "235", "236", "98", "230",
                    "105", "106", "113", "129", "257", "112", "437", "543", "687", "124", "297",
                    "331", "449", "450", "501", "508", "530",
                ],
            ),
            OfficialList::new(
                "graph_algorithms",
                "Graph Algorithms",
                "Graph algorithms and traversal problems",
                [
                    "200", "695", "130", "323", "261", "1584", "743", "787", "1971", "1466", "399",
                    "207", "210", "684", "685", "547", "1319", "990", "133",
                ],
            ),
            OfficialList::new(
                "backtracking",
                "Backtracking",
                "Backtracking and recursion problems",
                [
                    "17", "22", "39", "40", "46", "47", "77", "78", "90", "93", "131", "216",
                    "306", "357", "401", "526", "784", "842", "1079", "1219", "1239", "1240",
                    "1255", "1258", "1268", "1286", "1291", "1315", "1316", "1349",
                ],
            ),
        ])
    }

    /// Number of lists.
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Catalog entries.
    pub fn lists(&self) -> &[OfficialList] {
        &self.lists
    }

    /// Materialize every entry as a collection.
    pub fn collections(&self, now: DateTime<Utc>) -> Vec<Collection> {
        self.lists.iter().map(|l| l.to_collection(now)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_lists_have_unique_problems() {
        let now = Utc::now();
        for collection in OfficialCatalog::builtin().collections(now) {
            let ids: HashSet<_> = collection.problems.iter().map(|p| &p.id).collect();
            assert_eq!(ids.len(), collection.problems.len(), "{}", collection.name);
            assert!(collection.is_official);
            assert!(collection.id.starts_with("official_"));
        }
    }

    #[test]
    fn test_builtin_catalog_contents() {
        let catalog = OfficialCatalog::builtin();
        let keys: Vec<_> = catalog.lists().iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys.len(), 10);
        assert_eq!(keys[0], "hot100");
        assert_eq!(keys[2], "leetcode_75");

        let hot100 = &catalog.lists()[0];
        assert_eq!(hot100.name, "LeetCode Hot 100");
        assert_eq!(hot100.problem_ids.len(), 120);
        assert_eq!(hot100.problem_ids.last().map(String::as_str), Some("1791"));
        assert_eq!(catalog.lists()[2].name, "LeetCode 75");
    }

    #[test]
    fn test_repeated_ids_collapse() {
        let list = OfficialList::new("x", "X", "x", ["1", "2", "1"]);
        let collection = list.to_collection(Utc::now());
        assert_eq!(collection.problems.len(), 2);
        assert_eq!(collection.id, "official_x");
    }
}
