//! Keyword coverage of a retailored resume

use crate::error::{Result, RetailorError};
use crate::retailor::keywords::KEYWORDS_FIELD;
use aho_corasick::{AhoCorasick, MatchKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordCoverage {
    /// Keyword -> number of occurrences, for keywords found at least once
    pub found: BTreeMap<String, usize>,
    pub missing: Vec<String>,
    pub coverage: f32,
}

impl KeywordCoverage {
    /// Count keyword occurrences (ASCII case-insensitive) across every string
    /// value of `resume`, ignoring the keyword list itself.
    pub fn measure(keywords: &[String], resume: &Value) -> Result<Self> {
        let mut found: BTreeMap<String, usize> = BTreeMap::new();
        let mut missing = Vec::new();

        if keywords.is_empty() {
            return Ok(Self { found, missing, coverage: 0.0 });
        }

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::Standard)
            .build(keywords)
            .map_err(|e| RetailorError::InvalidInput(format!("Failed to build keyword matcher: {}", e)))?;

        let mut texts = Vec::new();
        collect_text(resume, true, &mut texts);

        let mut counts = vec![0usize; keywords.len()];
        for text in texts {
            // overlapping so "java" is still counted inside "javascript"
            for mat in matcher.find_overlapping_iter(text) {
                if is_word_bounded(text, mat.start(), mat.end()) {
                    counts[mat.pattern().as_usize()] += 1;
                }
            }
        }

        for (keyword, count) in keywords.iter().zip(counts) {
            if count > 0 {
                *found.entry(keyword.clone()).or_default() += count;
            } else if !missing.contains(keyword) {
                missing.push(keyword.clone());
            }
        }

        let coverage = found.len() as f32 / (found.len() + missing.len()) as f32;
        Ok(Self { found, missing, coverage })
    }
}

fn collect_text<'v>(value: &'v Value, top_level: bool, out: &mut Vec<&'v str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => items.iter().for_each(|v| collect_text(v, false, out)),
        Value::Object(map) => {
            for (key, v) in map {
                if top_level && key == KEYWORDS_FIELD {
                    continue;
                }
                collect_text(v, false, out);
            }
        }
        _ => {}
    }
}

fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.map_or(false, char::is_alphanumeric) && !after.map_or(false, char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kw(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_measure_coverage() {
        let resume = json!({
            "summary": "Backend engineer shipping Python and Docker services",
            "experience": [{"bullets": ["Built REST APIs on AWS", "Mentored via Scrum"]}],
            "keywords": ["kubernetes", "graphql"]
        });
        let keywords = kw(&["python", "docker", "aws", "rest", "kubernetes", "graphql"]);

        let coverage = KeywordCoverage::measure(&keywords, &resume).unwrap();
        assert_eq!(coverage.found.len(), 4);
        assert_eq!(coverage.missing, vec!["kubernetes", "graphql"]);
        assert!((coverage.coverage - 4.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_word_boundaries() {
        let resume = json!({"skills": ["JavaScript", "Java", "Said hi"]});
        let coverage = KeywordCoverage::measure(&kw(&["java", "javascript", "ai"]), &resume).unwrap();

        assert_eq!(coverage.found.get("java"), Some(&1));
        assert_eq!(coverage.found.get("javascript"), Some(&1));
        assert_eq!(coverage.missing, vec!["ai"]);
    }

    #[test]
    fn test_punctuated_keywords() {
        let resume = json!({"summary": "Owned CI/CD and Node.js services."});
        let coverage = KeywordCoverage::measure(&kw(&["ci/cd", "node.js"]), &resume).unwrap();
        assert!(coverage.missing.is_empty());
        assert_eq!(coverage.coverage, 1.0);
    }

    #[test]
    fn test_empty_keywords() {
        let coverage = KeywordCoverage::measure(&[], &json!({"a": "b"})).unwrap();
        assert!(coverage.found.is_empty());
        assert_eq!(coverage.coverage, 0.0);
    }
}
