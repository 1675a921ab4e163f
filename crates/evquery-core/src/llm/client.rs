//! HTTP client for OpenAI-compatible chat completion services

use super::sse::decode_chat_stream;
use crate::config::LLMServiceConfig;
use crate::error::{EvQueryError, Result};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Ordered, finite stream of reply fragments. Concatenation order is significant.
pub type FragmentStream = BoxStream<'static, Result<String>>;

/// Trait for LLM service clients
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a chat completion in one round trip
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String>;

    /// Generate a chat completion as a stream of text fragments
    async fn chat_completion_stream(&self, messages: Vec<ChatMessage>) -> Result<FragmentStream>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Chat message for completion requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Standard mode: one request, trimmed reply
pub async fn complete_standard(
    client: &dyn LLMClient,
    messages: Vec<ChatMessage>,
) -> Result<String> {
    let reply = client.chat_completion(messages).await?;
    Ok(reply.trim().to_string())
}

/// Streaming mode: fold fragments into the reply, handing each one to
/// `on_fragment` before the next is awaited
pub async fn complete_streaming<F>(
    client: &dyn LLMClient,
    messages: Vec<ChatMessage>,
    mut on_fragment: F,
) -> Result<String>
where
    F: FnMut(&str) + Send,
{
    let mut fragments = client.chat_completion_stream(messages).await?;
    let mut reply = String::new();

    while let Some(fragment) = fragments.next().await {
        let fragment = fragment?;
        if fragment.is_empty() {
            continue;
        }
        reply.push_str(&fragment);
        on_fragment(&fragment);
    }

    Ok(reply.trim().to_string())
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible client (OpenAI, vLLM, Ollama, LM Studio, ...)
pub struct OpenAIClient {
    http_client: reqwest::Client,
    config: LLMServiceConfig,
    api_key: String,
}

impl OpenAIClient {
    /// Create new client from configuration
    ///
    /// Fails with [`EvQueryError::ModelUnavailable`] when no API key is configured.
    pub fn new(config: LLMServiceConfig) -> Result<Self> {
        let api_key = config
            .api_key()
            .ok_or(EvQueryError::ModelUnavailable)?
            .to_string();

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(EvQueryError::Http)?;

        Ok(Self {
            http_client,
            config,
            api_key,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(LLMServiceConfig::default())
    }

    async fn send(&self, messages: &[ChatMessage], stream: bool) -> Result<reqwest::Response> {
        let request = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            response_format: ResponseFormat {
                kind: "json_object",
            },
            stream,
        };

        let mut req = self
            .http_client
            .post(self.config.completions_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request);

        if stream {
            req = req.header("Accept", "text/event-stream");
        }

        let response = req.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EvQueryError::ModelRequestFailed(format!(
                "LLM service error (HTTP {}): {}",
                status, body
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let start = Instant::now();
        let response = self.send(&messages, false).await?;
        let chat_response: ChatResponse = response.json().await?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| EvQueryError::ModelRequestFailed("No response from LLM".to_string()))?;

        tracing::debug!(
            "Chat completion from {} in {}ms",
            self.config.model,
            start.elapsed().as_millis()
        );

        Ok(content)
    }

    async fn chat_completion_stream(&self, messages: Vec<ChatMessage>) -> Result<FragmentStream> {
        let response = self.send(&messages, true).await?;
        tracing::debug!("Streaming chat completion from {}", self.config.model);
        Ok(decode_chat_stream(response.bytes_stream()))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
