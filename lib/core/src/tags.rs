//! Tag list parsing
//!
//! Two textual shapes reach the encoders: the catalog's tag cells
//! (`"['dogs-no', 'forest', 'views']"`) and the web layer's list literals.
//! Both are reduced to plain tag lists here.

use regex::Regex;
use std::sync::OnceLock;

fn quoted_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"'\s*([^']*?)\s*'").expect("static pattern is valid"))
}

/// Extract every single-quoted substring from a list literal.
///
/// `"['beach', 'lake']"` gives `["beach", "lake"]`. Input without quoted
/// substrings gives an empty list; this never fails.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    quoted_pattern()
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Canonical form of a tag as stored in vocabularies and column names
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().replace('-', "_")
}

/// Split a catalog tag cell into normalized, non-empty tags
pub fn split_catalog_tags(cell: &str) -> Vec<String> {
    let inner = cell.trim().trim_start_matches('[').trim_end_matches(']');
    inner
        .replace('\'', "")
        .split(", ")
        .map(normalize_tag)
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Sorted, de-duplicated vocabulary over a set of catalog tag cells
pub fn build_vocabulary<'a, I>(cells: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut vocabulary: Vec<String> = cells.into_iter().flat_map(split_catalog_tags).collect();
    vocabulary.sort();
    vocabulary.dedup();
    vocabulary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_tags() {
        assert_eq!(parse_tag_list("['beach']"), vec!["beach"]);
        assert_eq!(parse_tag_list("['fishing']"), vec!["fishing"]);
    }

    #[test]
    fn test_parse_trims_inside_quotes() {
        assert_eq!(
            parse_tag_list("[' lake ', 'views','forest']"),
            vec!["lake", "views", "forest"]
        );
    }

    #[test]
    fn test_parse_malformed_is_empty() {
        assert!(parse_tag_list("").is_empty());
        assert!(parse_tag_list("[]").is_empty());
        assert!(parse_tag_list("beach, lake").is_empty());
    }

    #[test]
    fn test_split_catalog_cell() {
        assert_eq!(
            split_catalog_tags("['dogs-no', 'forest', 'views', 'wild-flowers']"),
            vec!["dogs_no", "forest", "views", "wild_flowers"]
        );
        assert!(split_catalog_tags("[]").is_empty());
    }

    #[test]
    fn test_vocabulary_sorted_unique() {
        let vocabulary = build_vocabulary([
            "['views', 'forest']",
            "['lake', 'views']",
            "[]",
        ]);
        assert_eq!(vocabulary, vec!["forest", "lake", "views"]);
    }
}
