//! Job-description keyword list and its injection into the resume record

use crate::error::{Result, RetailorError};
use serde_json::Value;
use std::path::Path;

/// Field of the resume record that carries the keyword list in `jd` mode.
pub const KEYWORDS_FIELD: &str = "keywords";

/// Keywords for a generic software engineering role.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "software development",
    "programming",
    "technology",
    "python",
    "java",
    "javascript",
    "react",
    "node.js",
    "aws",
    "docker",
    "kubernetes",
    "sql",
    "mongodb",
    "postgresql",
    "machine learning",
    "ai",
    "data science",
    "api",
    "rest",
    "graphql",
    "microservices",
    "agile",
    "scrum",
    "git",
    "devops",
    "ci/cd",
    "testing",
    "frontend",
    "backend",
    "full stack",
    "flask",
    "django",
    "azure",
    "gcp",
];

/// Store `keywords` verbatim under [`KEYWORDS_FIELD`], replacing any existing value.
pub fn apply_keywords(resume: &mut Value, keywords: &[String]) -> Result<()> {
    let record = resume.as_object_mut().ok_or_else(|| {
        RetailorError::InvalidInput("resume JSON must be an object to receive keywords".to_string())
    })?;
    let list = keywords.iter().cloned().map(Value::String).collect();
    record.insert(KEYWORDS_FIELD.to_string(), Value::Array(list));
    Ok(())
}

/// Read back the keyword list from a resume record. Non-string entries are skipped.
pub fn keywords_from_resume(resume: &Value) -> Vec<String> {
    resume
        .get(KEYWORDS_FIELD)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Load keywords from a file: a JSON array of strings, or one keyword per line.
/// Blank lines and lines starting with `#` are ignored.
pub fn load_keywords_file(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(RetailorError::FileNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    parse_keywords(&content)
}

fn parse_keywords(content: &str) -> Result<Vec<String>> {
    let trimmed = content.trim_start();
    let keywords: Vec<String> = if trimmed.starts_with('[') {
        let parsed: Vec<String> = serde_json::from_str(trimmed)
            .map_err(|e| RetailorError::InvalidJson(format!("keyword list: {}", e)))?;
        parsed.into_iter().map(|k| k.trim().to_string()).collect()
    } else {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.starts_with('#'))
            .map(str::to_string)
            .collect()
    };

    let keywords: Vec<String> = keywords.into_iter().filter(|k| !k.is_empty()).collect();
    if keywords.is_empty() {
        return Err(RetailorError::InvalidInput("keyword list is empty".to_string()));
    }
    Ok(keywords)
}

pub fn default_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
}
