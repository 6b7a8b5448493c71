//! Status lines on stderr; stdout is reserved for JSON

use crate::retailor::coverage::KeywordCoverage;
use colored::{Color, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{json, Value};
use std::time::Duration;

pub struct Console {
    use_colors: bool,
}

impl Console {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn banner(&self, title: &str) {
        let line = format!("=== {} ===", title);
        if self.use_colors {
            eprintln!("\n{}", line.color(Color::Blue).bold());
        } else {
            eprintln!("\n{}", line);
        }
    }

    pub fn info(&self, message: &str) {
        eprintln!("{}", message);
    }

    pub fn success(&self, message: &str) {
        eprintln!("{} {}", self.colorize("✅", Color::Green), self.colorize(message, Color::Green));
    }

    pub fn failure(&self, message: &str) {
        eprintln!("{} {}", self.colorize("❌", Color::Red), self.colorize(message, Color::Red));
    }

    pub fn keywords(&self, keywords: &[String]) {
        eprintln!("\n🔑 Using Keywords: {}", self.colorize(&keywords.join(", "), Color::Cyan));
    }

    pub fn coverage(&self, coverage: &KeywordCoverage) {
        let percent = (coverage.coverage * 100.0).round() as u32;
        let color = match percent {
            80..=100 => Color::Green,
            50..=79 => Color::Yellow,
            _ => Color::Red,
        };
        let total = coverage.found.len() + coverage.missing.len();
        eprintln!(
            "🎯 Keyword coverage: {} ({} of {})",
            self.colorize(&format!("{}%", percent), color),
            coverage.found.len(),
            total
        );
        if !coverage.missing.is_empty() {
            eprintln!("   Missing: {}", coverage.missing.join(", "));
        }
    }

    /// Spinner shown while waiting on the model.
    pub fn spinner(&self, message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }
}

/// Serialize the retailored record for stdout.
pub fn format_result(result: &Value, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(result)
    } else {
        serde_json::to_string(result)
    }
}

/// `{"error": "<message>"}` as printed on stdout for failed runs.
pub fn error_json(message: &str) -> String {
    json!({ "error": message }).to_string()
}
