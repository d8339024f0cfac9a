//! Text-generation provider.
//!
//! A single stateless `generate(prompt, max_tokens)` call used for ask-bar
//! replies and submission feedback. The HTTP client supports Anthropic and
//! OpenAI-compatible APIs; without an API key the offline generator answers.

pub mod prompts;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::GenerationConfig;
use crate::errors::AppError;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, AppError>;
}

/// API format type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

impl ApiFormat {
    /// Detect API format from URL
    pub fn detect(url: &str) -> Self {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAI
        }
    }
}

/// HTTP client for a hosted completion API. Calls have no timeout.
pub struct HttpGenerator {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
}

impl HttpGenerator {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let api_format = ApiFormat::detect(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            api_format,
        }
    }

    async fn generate_anthropic(&self, prompt: &str, max_tokens: u32) -> Result<String, AppError> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens,
            messages: vec![Message {
                role: "user".into(),
                content: prompt.into(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Generation(format!(
                "API error {}: {}",
                status, error_text
            )));
        }

        let completion: AnthropicResponse = response.json().await?;
        completion
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| AppError::Generation("Empty response".into()))
    }

    async fn generate_openai(&self, prompt: &str, max_tokens: u32) -> Result<String, AppError> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            max_tokens,
            messages: vec![Message {
                role: "user".into(),
                content: prompt.into(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Generation(format!(
                "API error {}: {}",
                status, error_text
            )));
        }

        let completion: OpenAIResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::Generation("Empty response".into()))
    }
}

#[async_trait]
impl TextGenerator for HttpGenerator {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, AppError> {
        tracing::debug!(
            "Generating text ({:?}, model {}, max {} tokens)",
            self.api_format,
            self.model,
            max_tokens
        );
        match self.api_format {
            ApiFormat::Anthropic => self.generate_anthropic(prompt, max_tokens).await,
            ApiFormat::OpenAI => self.generate_openai(prompt, max_tokens).await,
        }
    }
}

/// Canned replies for deployments without a generation API key.
#[derive(Debug, Default, Clone)]
pub struct OfflineGenerator;

pub const OFFLINE_REPLY: &str = "AI text generation is not configured for this deployment. \
                                 Your request has been recorded and any matching actions were applied.";

#[async_trait]
impl TextGenerator for OfflineGenerator {
    async fn generate(&self, _prompt: &str, _max_tokens: u32) -> Result<String, AppError> {
        Ok(OFFLINE_REPLY.to_string())
    }
}

/// Pick the generator the configuration asks for.
pub fn from_config(config: &GenerationConfig) -> Arc<dyn TextGenerator> {
    match &config.api_key {
        Some(key) => {
            tracing::info!("Text generation via {}", config.api_url);
            Arc::new(HttpGenerator::new(
                key.clone(),
                config.api_url.clone(),
                config.model.clone(),
            ))
        }
        None => {
            tracing::warn!("TEAMDESK_LLM_API_KEY not set, using offline text generator");
            Arc::new(OfflineGenerator)
        }
    }
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// OpenAI-compatible API format
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}
