//! AI chat-completion providers.
//!
//! Mistral and OpenAI both speak the OpenAI-compatible `/chat/completions`
//! protocol, so a single adapter covers both; construction picks the base
//! URL, key and model. A `MockProvider` stands in when no key is configured.

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("provider {provider} failed: {message}")]
    Provider { provider: String, message: String },
    #[error("failed to parse provider response: {0}")]
    Parse(String),
    #[error("all providers failed")]
    AllTiersFailed,
}

/// One turn in a chat-completion conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// Per-call sampling settings; each task has its own.
#[derive(Debug, Clone, Copy)]
pub struct Sampling {
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait AiProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Run one chat completion and return the assistant text.
    async fn complete(&self, messages: &[ChatTurn], sampling: Sampling) -> Result<String, AiError>;
}

// --- OpenAI-compatible HTTP adapter ------------------------------------

const MISTRAL_BASE_URL: &str = "https://api.mistral.ai/v1";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatTurn,
}

/// Adapter for any OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct ChatCompletionsAdapter {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    http_client: Client,
}

impl ChatCompletionsAdapter {
    pub fn mistral(api_key: String, model: String, http_client: Client) -> Self {
        Self {
            name: "mistral".to_string(),
            base_url: MISTRAL_BASE_URL.to_string(),
            api_key,
            model,
            http_client,
        }
    }

    pub fn openai(api_key: String, model: String, http_client: Client) -> Self {
        Self {
            name: "openai".to_string(),
            base_url: OPENAI_BASE_URL.to_string(),
            api_key,
            model,
            http_client,
        }
    }
}

#[async_trait]
impl AiProvider for ChatCompletionsAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, messages: &[ChatTurn], sampling: Sampling) -> Result<String, AiError> {
        let chat_url = format!("{}/chat/completions", self.base_url);
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
        };

        debug!(
            "Sending request to {} API: model={}, messages_count={}",
            self.name,
            self.model,
            messages.len()
        );

        let response = self
            .http_client
            .post(&chat_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| AiError::Provider { provider: self.name.clone(), message: e.to_string() })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            error!("{} API request failed with status {}: {}", self.name, status, error_body);
            return Err(AiError::Provider {
                provider: self.name.clone(),
                message: format!("status {}: {}", status, error_body),
            });
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|e| AiError::Provider {
            provider: self.name.clone(),
            message: format!("failed to deserialize response: {}", e),
        })?;

        match body.choices.first() {
            Some(choice) => Ok(choice.message.content.trim().to_string()),
            None => Err(AiError::Provider {
                provider: self.name.clone(),
                message: "response contained no choices".to_string(),
            }),
        }
    }
}

// --- Mock provider ------------------------------------------------------

/// Offline stand-in used when no API key is configured.
#[derive(Debug, Default)]
pub struct MockProvider;

#[async_trait]
impl AiProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, messages: &[ChatTurn], _sampling: Sampling) -> Result<String, AiError> {
        if let Some(last) = messages.last() {
            if last.role == "user" {
                return Ok(format!("Mock response to: {}", last.content));
            }
        }
        Ok("This is a mock AI response.".to_string())
    }
}
