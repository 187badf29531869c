//! HTTP clients for model providers (OpenAI-compatible services and Ollama)
//!
//! A client issues exactly one prompt to one named model and returns raw
//! text or a provider failure. Retries and fallback live in
//! [`crate::llm::fallback`], not here.

use crate::config::{ProviderConfig, ProviderKind};
use crate::error::{PolicyLensError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Trait for model provider clients
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send one prompt, return the model's raw text
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Provider id used in failure reports
    fn provider_id(&self) -> &str;

    /// Model name
    fn model_name(&self) -> &str;
}

/// Chat message for completion requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Build a client from a provider descriptor
pub fn client_for(config: &ProviderConfig) -> Result<Arc<dyn ModelClient>> {
    Ok(match config.kind {
        ProviderKind::OpenAi => Arc::new(OpenAiClient::new(config.clone())?),
        ProviderKind::Ollama => Arc::new(OllamaClient::new(config.clone())?),
    })
}

fn provider_error(config: &ProviderConfig, message: impl std::fmt::Display) -> PolicyLensError {
    PolicyLensError::Provider {
        provider: config.id.clone(),
        message: message.to_string(),
    }
}

/// OpenAI-compatible chat completions client (vLLM, OpenAI, etc.)
pub struct OpenAiClient {
    http_client: reqwest::Client,
    config: ProviderConfig,
}

impl OpenAiClient {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http_client,
            config,
        })
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct ChatRequest {
            model: String,
            messages: Vec<ChatMessage>,
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChatMessage,
        }

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: 0.0,
        };

        let url = format!("{}/v1/chat/completions", self.config.url);

        let mut req = self.http_client.post(&url).json(&request);
        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req
            .send()
            .await
            .map_err(|e| provider_error(&self.config, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(provider_error(
                &self.config,
                format!("HTTP {}: {}", status, body),
            ));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| provider_error(&self.config, e))?;

        let content = chat_response
            .choices
            .first()
            .ok_or_else(|| provider_error(&self.config, "no choices in response"))?
            .message
            .content
            .trim()
            .to_string();

        Ok(content)
    }

    fn provider_id(&self) -> &str {
        &self.config.id
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Ollama chat client (local models)
pub struct OllamaClient {
    http_client: reqwest::Client,
    config: ProviderConfig,
}

impl OllamaClient {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http_client,
            config,
        })
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct OllamaRequest {
            model: String,
            messages: Vec<ChatMessage>,
            stream: bool,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            message: ChatMessage,
        }

        let request = OllamaRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            stream: false,
        };

        let url = format!("{}/api/chat", self.config.url);

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| provider_error(&self.config, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(provider_error(
                &self.config,
                format!("HTTP {}: {}", status, body),
            ));
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| provider_error(&self.config, e))?;

        Ok(ollama_response.message.content.trim().to_string())
    }

    fn provider_id(&self) -> &str {
        &self.config.id
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
