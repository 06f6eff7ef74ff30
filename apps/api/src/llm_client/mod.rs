//! LLM Client: the single point of entry for text-generation calls.
//!
//! Talks to an OpenAI-compatible `/chat/completions` endpoint (Groq by default).
//! Handlers never call the provider directly; they go through `TextGenerator`
//! so tests can swap in a fake.
//!
//! No retries and no caching: the same prompt may return different text on
//! every call, and each failure is reported to the caller as-is.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::ServiceError;

const MAX_TOKENS: u32 = 2048;
const TEMPERATURE: f32 = 0.4;

/// Text-generation capability consumed by the study pipeline.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str, model: &str)
        -> Result<String, ServiceError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text of the first choice, if it has any non-blank content.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// HTTP client for the OpenAI-compatible chat API.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
            base_url: config.llm_base_url.clone(),
            api_key: config.groq_api_key.clone(),
        })
    }

    /// Makes a raw chat-completion call, returning the full response object.
    pub async fn call(
        &self,
        system: &str,
        prompt: &str,
        model: &str,
    ) -> Result<ChatResponse, ServiceError> {
        let request_body = ChatRequest {
            model,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            warn!("LLM response could not be decoded: {e}");
            ServiceError::ServiceUnavailable("malformed response from generation service".into())
        })?;

        if let Some(usage) = &chat.usage {
            debug!(
                "LLM call succeeded: model={}, prompt_tokens={}, completion_tokens={}",
                model, usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        model: &str,
    ) -> Result<String, ServiceError> {
        let response = self.call(system, prompt, model).await?;
        response
            .text()
            .map(|t| t.trim().to_string())
            .ok_or(ServiceError::EmptyResponse)
    }
}

/// Shared reqwest client: one per collaborator, bounded by the request timeout.
pub(crate) fn build_http_client(config: &Config) -> Result<Client> {
    Client::builder()
        .timeout(config.request_timeout())
        .build()
        .context("Failed to build HTTP client")
}

/// Maps a non-success provider status onto the service error kinds.
pub(crate) fn status_error(status: StatusCode, body: &str) -> ServiceError {
    let message = serde_json::from_str::<ProviderError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect());
    warn!("Provider returned {status}: {message}");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceError::Auth,
        StatusCode::TOO_MANY_REQUESTS => ServiceError::RateLimited,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ServiceError::Timeout,
        _ => ServiceError::ServiceUnavailable(format!("status {}", status.as_u16())),
    }
}

pub(crate) fn transport_error(e: &reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::Timeout
    } else {
        warn!("Provider request failed: {e}");
        ServiceError::ServiceUnavailable("could not reach the service".into())
    }
}
