//! Azure OpenAI chat completions client

use crate::config::AzureConfig;
use crate::error::{Result, RetailorError};
use crate::llm::provider::{
    ChatCompletion, ChatMessage, ChatRequest, CompletionProvider, ResponseFormat, TokenUsage,
};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Client for a single Azure OpenAI deployment.
pub struct AzureOpenAiClient {
    client: Client,
    api_key: String,
    deployment: String,
    chat_url: Url,
}

#[derive(Serialize, Debug)]
struct AzureChatRequest<'a> {
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    response_format: AzureResponseFormat,
}

#[derive(Serialize, Debug)]
struct AzureResponseFormat {
    #[serde(rename = "type")]
    format_type: ResponseFormat,
}

#[derive(Deserialize, Debug)]
struct AzureChatResponse {
    choices: Vec<AzureChatChoice>,
    usage: Option<TokenUsage>,
}

#[derive(Deserialize, Debug)]
struct AzureChatChoice {
    message: AzureChatMsg,
}

#[derive(Deserialize, Debug)]
struct AzureChatMsg {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct AzureErrorEnvelope {
    error: AzureErrorBody,
}

#[derive(Deserialize, Debug)]
struct AzureErrorBody {
    message: String,
}

impl AzureOpenAiClient {
    /// Validate the configuration and build the HTTP client.
    pub fn new(config: &AzureConfig) -> Result<Self> {
        config.validate()?;

        let chat_url = chat_completions_url(&config.endpoint, &config.deployment, &config.api_version)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            deployment: config.deployment.clone(),
            chat_url,
        })
    }

    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }
}

#[async_trait]
impl CompletionProvider for AzureOpenAiClient {
    fn name(&self) -> &str {
        &self.deployment
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        let body = AzureChatRequest {
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: AzureResponseFormat { format_type: request.response_format },
        };

        debug!(
            "Sending chat request to deployment '{}' ({} messages, {} prompt chars)",
            self.deployment,
            request.messages.len(),
            request.prompt_len()
        );
        let started = Instant::now();

        let response = self
            .client
            .post(self.chat_url.clone())
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!("Chat response {} in {}ms ({} bytes)", status, started.elapsed().as_millis(), text.len());

        if !status.is_success() {
            return Err(api_error(status.as_u16(), text));
        }

        parse_chat_response(&text)
    }
}

/// `{endpoint}/openai/deployments/{deployment}/chat/completions?api-version={version}`
pub fn chat_completions_url(endpoint: &str, deployment: &str, api_version: &str) -> Result<Url> {
    let base = format!(
        "{}/openai/deployments/{}/",
        endpoint.trim().trim_end_matches('/'),
        deployment.trim()
    );
    let mut url = Url::parse(&base)
        .and_then(|u| u.join("chat/completions"))
        .map_err(|e| RetailorError::Configuration(format!("Invalid endpoint '{}': {}", endpoint, e)))?;
    url.query_pairs_mut().append_pair("api-version", api_version.trim());
    Ok(url)
}

fn api_error(status: u16, body: String) -> RetailorError {
    let message = serde_json::from_str::<AzureErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    RetailorError::Api { status, message }
}

fn parse_chat_response(body: &str) -> Result<ChatCompletion> {
    let parsed: AzureChatResponse = serde_json::from_str(body)?;
    let text = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|t| !t.trim().is_empty())
        .ok_or(RetailorError::EmptyCompletion)?;

    if let Some(usage) = &parsed.usage {
        debug!(
            "Token usage: prompt={}, completion={}, total={}",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }

    Ok(ChatCompletion { text, usage: parsed.usage })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::ChatMessage;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn config() -> AzureConfig {
        AzureConfig {
            api_key: "test-key".to_string(),
            endpoint: "https://contoso.openai.azure.com/".to_string(),
            ..AzureConfig::default()
        }
    }

    #[test]
    fn test_chat_url() {
        let url = chat_completions_url("https://contoso.openai.azure.com/", "gpt-4o-mini", "2024-08-01-preview").unwrap();
        assert_eq!(
            url.as_str(),
            "https://contoso.openai.azure.com/openai/deployments/gpt-4o-mini/chat/completions?api-version=2024-08-01-preview"
        );

        // trailing slash on the endpoint is optional
        let url = chat_completions_url("https://contoso.openai.azure.com", "d", "v1").unwrap();
        assert_eq!(url.path(), "/openai/deployments/d/chat/completions");
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = chat_completions_url("not a url", "d", "v1").unwrap_err();
        assert!(matches!(err, RetailorError::Configuration(_)));
    }

    #[test]
    fn test_client_requires_credentials() {
        let mut cfg = config();
        cfg.api_key.clear();
        assert!(matches!(AzureOpenAiClient::new(&cfg), Err(RetailorError::Configuration(_))));

        let client = AzureOpenAiClient::new(&config()).unwrap();
        assert_eq!(client.name(), "gpt-4o-mini");
        assert!(client.chat_url().as_str().ends_with("api-version=2024-08-01-preview"));
    }

    #[test]
    fn test_request_body_shape() {
        let messages = vec![ChatMessage::system("You are a helpful assistant."), ChatMessage::user("Say hello!")];
        let body = AzureChatRequest {
            messages: &messages,
            temperature: Some(0.1),
            max_tokens: None,
            response_format: AzureResponseFormat { format_type: ResponseFormat::Text },
        };
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "Say hello!");
        assert_eq!(value["response_format"]["type"], "text");
        assert!(value.get("max_tokens").is_none());
    }

    #[test]
    fn test_parse_chat_response() {
        let body = r#"{
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hello!"}}],
            "usage": {"prompt_tokens": 20, "completion_tokens": 2, "total_tokens": 22}
        }"#;
        let completion = parse_chat_response(body).unwrap();
        assert_eq!(completion.text, "Hello!");
        assert_eq!(completion.usage.unwrap().total_tokens, 22);
    }

    #[test]
    fn test_parse_empty_choices() {
        let body = r#"{"choices": []}"#;
        assert!(matches!(parse_chat_response(body), Err(RetailorError::EmptyCompletion)));

        let body = r#"{"choices": [{"message": {"content": null}}]}"#;
        assert!(matches!(parse_chat_response(body), Err(RetailorError::EmptyCompletion)));
    }

    #[test]
    fn test_api_error_uses_service_message() {
        let err = api_error(401, r#"{"error": {"code": "401", "message": "Access denied due to invalid subscription key."}}"#.to_string());
        match err {
            RetailorError::Api { status, message } => {
                assert_eq!(status, 401);
                assert!(message.starts_with("Access denied"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = api_error(502, "Bad Gateway".to_string());
        assert_eq!(err.to_string(), "API error (status 502): Bad Gateway");
    }

    /// Accept a single connection, answer it with `status` and `body`, and
    /// hand back the raw request text.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });
        (endpoint, server)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut raw = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&raw);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length: usize = text[..head_end]
                    .lines()
                    .find_map(|line| {
                        let line = line.to_ascii_lowercase();
                        let length = line.strip_prefix("content-length:")?.trim().parse().ok();
                        length
                    })
                    .unwrap_or(0);
                if raw.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8(raw).unwrap()
    }

    #[tokio::test]
    async fn test_complete_posts_to_deployment() {
        let reply = r#"{"choices": [{"message": {"role": "assistant", "content": "Hello!"}}]}"#;
        let (endpoint, server) = serve_once("200 OK", reply).await;
        let client = AzureOpenAiClient::new(&AzureConfig { endpoint, ..config() }).unwrap();

        let request = ChatRequest::new(vec![ChatMessage::user("Say hello!")]).temperature(0.1);
        let completion = client.complete(&request).await.unwrap();
        assert_eq!(completion.text, "Hello!");

        let raw = server.await.unwrap();
        let (head, body) = raw.split_once("\r\n\r\n").unwrap();
        assert!(
            head.starts_with(
                "POST /openai/deployments/gpt-4o-mini/chat/completions?api-version=2024-08-01-preview HTTP/1.1\r\n"
            ),
            "request head: {head}"
        );
        let head = head.to_ascii_lowercase();
        assert!(head.contains("\r\napi-key: test-key\r\n"), "request head: {head}");
        assert!(!head.contains("authorization:"));

        let sent: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(sent["messages"][0]["role"], "user");
        assert_eq!(sent["messages"][0]["content"], "Say hello!");
    }

    #[tokio::test]
    async fn test_complete_maps_error_status() {
        let envelope = r#"{"error": {"code": "401", "message": "Access denied due to invalid subscription key."}}"#;
        let (endpoint, server) = serve_once("401 Unauthorized", envelope).await;
        let client = AzureOpenAiClient::new(&AzureConfig { endpoint, ..config() }).unwrap();

        let request = ChatRequest::new(vec![ChatMessage::user("Say hello!")]);
        match client.complete(&request).await {
            Err(RetailorError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Access denied due to invalid subscription key.");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        server.await.unwrap();
    }
}
