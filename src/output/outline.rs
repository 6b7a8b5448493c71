//! Format-neutral outline of a resume record
//!
//! The retailored record has no fixed schema, so every renderer walks the same
//! outline: a title, then one section per top-level field. Strings become
//! paragraphs, arrays become bullet lists and objects become labelled fields,
//! with entry-like objects (a job, a degree) introduced by a subheading.

use crate::retailor::keywords::KEYWORDS_FIELD;
use serde_json::{Map, Value};

const TITLE_KEYS: &[&str] = &["name", "full_name", "fullName"];
const PERSON_KEYS: &[&str] = &["contact", "contact_info", "personal_info", "personal_information", "basics"];
const HEADLINE_KEYS: &[&str] = &["title", "position", "role", "job_title", "degree", "name"];
const ORGANIZATION_KEYS: &[&str] = &["company", "organization", "employer", "institution", "school", "university"];

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Subheading(String),
    Paragraph(String),
    Label(String),
    Field { label: String, value: String },
    Bullet { depth: usize, text: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub heading: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentOutline {
    pub title: Option<String>,
    pub sections: Vec<Section>,
}

impl DocumentOutline {
    pub fn from_resume(resume: &Value) -> Self {
        let record = match resume {
            Value::Object(map) => map,
            other => {
                let mut blocks = Vec::new();
                push_value(other, 0, &mut blocks);
                return Self {
                    title: None,
                    sections: vec![Section { heading: "Resume".to_string(), blocks }],
                };
            }
        };

        let (title, title_key) = find_title(record);
        let mut sections = Vec::new();

        for (key, value) in record {
            if key == KEYWORDS_FIELD || Some(key.as_str()) == title_key || is_empty(value) {
                continue;
            }
            let mut blocks = Vec::new();
            push_value(value, 0, &mut blocks);
            if !blocks.is_empty() {
                sections.push(Section { heading: humanize(key), blocks });
            }
        }

        Self { title, sections }
    }
}

fn find_title(record: &Map<String, Value>) -> (Option<String>, Option<&'static str>) {
    for key in TITLE_KEYS {
        if let Some(name) = record.get(*key).and_then(non_blank) {
            return (Some(name), Some(*key));
        }
    }
    // a nested contact block keeps its own section, only the name is borrowed
    for key in PERSON_KEYS {
        let nested = record.get(*key).and_then(Value::as_object);
        if let Some(name) = nested.and_then(|m| first_string(m, TITLE_KEYS)) {
            return (Some(name), None);
        }
    }
    (None, None)
}

fn push_value(value: &Value, depth: usize, blocks: &mut Vec<Block>) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(map) => push_entry(map, depth, blocks),
                    Value::Array(_) => push_value(item, depth + 1, blocks),
                    scalar => {
                        if let Some(text) = scalar_text(scalar) {
                            blocks.push(Block::Bullet { depth, text });
                        }
                    }
                }
            }
        }
        Value::Object(map) => push_entry(map, depth, blocks),
        scalar => {
            if let Some(text) = scalar_text(scalar) {
                blocks.push(Block::Paragraph(text));
            }
        }
    }
}

fn push_entry(map: &Map<String, Value>, depth: usize, blocks: &mut Vec<Block>) {
    let headline_key = HEADLINE_KEYS.iter().find(|k| map.get(**k).map_or(false, Value::is_string));
    let organization_key = ORGANIZATION_KEYS.iter().find(|k| map.get(**k).map_or(false, Value::is_string));

    let headline: Vec<String> = [headline_key, organization_key]
        .into_iter()
        .flatten()
        .filter_map(|k| map.get(*k).and_then(scalar_text))
        .collect();
    if !headline.is_empty() {
        blocks.push(Block::Subheading(headline.join(", ")));
    }

    for (key, value) in map {
        if Some(&key.as_str()) == headline_key || Some(&key.as_str()) == organization_key || is_empty(value) {
            continue;
        }
        match value {
            Value::Array(_) | Value::Object(_) => {
                blocks.push(Block::Label(humanize(key)));
                push_value(value, depth + 1, blocks);
            }
            scalar => {
                if let Some(text) = scalar_text(scalar) {
                    blocks.push(Block::Field { label: humanize(key), value: text });
                }
            }
        }
    }
}

fn first_string(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| map.get(*k).and_then(non_blank))
}

fn non_blank(value: &Value) -> Option<String> {
    let trimmed = value.as_str()?.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "Yes" } else { "No" }.to_string()),
        _ => None,
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.iter().all(is_empty),
        Value::Object(map) => map.values().all(is_empty),
        _ => false,
    }
}

/// `work_experience` / `workExperience` -> `Work Experience`
pub fn humanize(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in key.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
