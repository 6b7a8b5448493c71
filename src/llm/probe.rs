//! Connectivity probe: one fixed chat call to prove the deployment answers

use crate::error::Result;
use crate::llm::prompts::{PROBE_SYSTEM_PROMPT, PROBE_TEMPERATURE, PROBE_USER_PROMPT};
use crate::llm::provider::{ChatMessage, ChatRequest, CompletionProvider, ResponseFormat};
use log::info;

pub const FAILURE_HINT: &str = "Check your endpoint, API key, and deployment name.";

pub fn probe_request() -> ChatRequest {
    ChatRequest::new(vec![
        ChatMessage::system(PROBE_SYSTEM_PROMPT),
        ChatMessage::user(PROBE_USER_PROMPT),
    ])
    .temperature(PROBE_TEMPERATURE)
    .response_format(ResponseFormat::Text)
}

/// Send the probe and return the trimmed reply.
pub async fn run_probe(provider: &dyn CompletionProvider) -> Result<String> {
    info!("Testing connection with deployment: {}", provider.name());
    let completion = provider.complete(&probe_request()).await?;
    Ok(completion.text.trim().to_string())
}
