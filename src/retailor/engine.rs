//! Retailoring routines on top of a completion provider

use crate::config::RetailorConfig;
use crate::error::{Result, RetailorError};
use crate::llm::prompts::PromptTemplates;
use crate::llm::provider::{ChatMessage, ChatRequest, CompletionProvider, ResponseFormat};
use crate::retailor::keywords::keywords_from_resume;
use crate::retailor::Mode;
use log::{debug, info};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Instant;

pub struct Retailor<'a> {
    provider: &'a dyn CompletionProvider,
    templates: PromptTemplates,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl<'a> Retailor<'a> {
    pub fn new(provider: &'a dyn CompletionProvider, config: &RetailorConfig) -> Self {
        Self {
            provider,
            templates: PromptTemplates::default(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Run the routine for `mode` exactly once. There is no fallback between modes.
    pub async fn dispatch(&self, mode: Mode, resume: &Value) -> Result<Value> {
        match mode {
            Mode::Jd => self.retailor_with_jd(resume).await,
            Mode::Nojd => self.retailor_without_jd(resume).await,
        }
    }

    /// Rewrite the resume steered by the keyword list stored in its `keywords` field.
    pub async fn retailor_with_jd(&self, resume: &Value) -> Result<Value> {
        let keywords = keywords_from_resume(resume);
        debug!("Retailoring with {} keywords", keywords.len());
        let system = self.templates.render_with_jd_system(&keywords);
        self.retailor(Mode::Jd, system, resume).await
    }

    pub async fn retailor_without_jd(&self, resume: &Value) -> Result<Value> {
        let system = self.templates.render_without_jd_system();
        self.retailor(Mode::Nojd, system, resume).await
    }

    async fn retailor(&self, mode: Mode, system: String, resume: &Value) -> Result<Value> {
        let resume_json = serde_json::to_string_pretty(resume)?;
        let request = ChatRequest::new(vec![
            ChatMessage::system(system),
            ChatMessage::user(self.templates.render_user_message(&resume_json)),
        ])
        .temperature(self.temperature)
        .max_tokens(self.max_tokens)
        .response_format(ResponseFormat::JsonObject);

        info!("Retailoring resume ({} mode) with {}", mode, self.provider.name());
        let started = Instant::now();
        let completion = self.provider.complete(&request).await?;
        info!("Model replied in {}ms", started.elapsed().as_millis());

        let result = parse_json_reply(&completion.text)?;
        if let Some(message) = error_field(&result) {
            return Err(RetailorError::Retailoring(message));
        }
        Ok(result)
    }
}

/// Parse the model reply as JSON, tolerating a surrounding Markdown code fence.
pub fn parse_json_reply(text: &str) -> Result<Value> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(RetailorError::EmptyCompletion);
    }
    serde_json::from_str(body).map_err(|e| RetailorError::MalformedCompletion(e.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)^```[A-Za-z0-9_-]*\s*\n(.*?)\n?```$").expect("fence pattern is valid")
    });

    let trimmed = text.trim();
    match fence.captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}

/// An object result carrying an `error` field is a failed retailoring.
pub fn error_field(result: &Value) -> Option<String> {
    let error = result.as_object()?.get("error")?;
    match error {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}
