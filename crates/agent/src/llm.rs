use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cirqle_core::config::LlmConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard per-request limit for the completion endpoint. Requests are never retried.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("llm client setup failed: {0}")]
    Setup(String),
    #[error("llm request timed out")]
    Timeout,
    #[error("llm transport failure: {0}")]
    Transport(String),
    #[error("llm endpoint returned status {0}")]
    Status(u16),
    #[error("could not decode llm response: {0}")]
    Decode(String),
    #[error("llm response contained no completion text")]
    EmptyCompletion,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single best-effort completion; returns the trimmed text of the first choice.
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;
}

/// Client for OpenAI-compatible `/chat/completions` endpoints.
pub struct OpenAiChatClient {
    http: Client,
    endpoint: String,
    api_key: SecretString,
    model: String,
}

impl OpenAiChatClient {
    pub fn new(
        base_url: &str,
        api_key: SecretString,
        model: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| LlmError::Setup(error.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model: model.into(),
        })
    }

    /// `None` when no credential is configured.
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>, LlmError> {
        let api_key = match &config.api_key {
            Some(key) if config.has_credential() => key.clone(),
            _ => return Ok(None),
        };
        Self::new(&config.base_url, api_key, config.model.clone()).map(Some)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Shared client handle for the configured provider, `None` in demo mode.
pub fn client_from_config(config: &LlmConfig) -> Result<Option<Arc<dyn LlmClient>>, LlmError> {
    let client = OpenAiChatClient::from_config(config)?;
    Ok(client.map(|client| Arc::new(client) as Arc<dyn LlmClient>))
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[async_trait]
impl LlmClient for OpenAiChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let body = CompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Status(status.as_u16()));
        }

        let text = response.text().await.map_err(transport_error)?;
        parse_completion(&text)
    }
}

fn transport_error(error: reqwest::Error) -> LlmError {
    if error.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Transport(error.to_string())
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Extract the first choice's message text from a chat-completions body.
pub fn parse_completion(body: &str) -> Result<String, LlmError> {
    let response: CompletionResponse =
        serde_json::from_str(body).map_err(|error| LlmError::Decode(error.to_string()))?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default();

    if content.is_empty() {
        return Err(LlmError::EmptyCompletion);
    }
    Ok(content)
}
