//! Chat-completion client implementations
//!
//! Groq and OpenAI share the OpenAI-compatible `/chat/completions` API;
//! Ollama is reached through its native `/api/chat` endpoint. All requests
//! are non-streaming and attempted once.
//!
//! Author: hephaex@gmail.com

use async_trait::async_trait;
use cvsearch_core::{ConfigError, CvError, LlmClient, LlmConfig, LlmProvider, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize, Deserialize, Clone)]
struct Message {
    role: String,
    content: String,
}

impl Message {
    fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

// ============================================================================
// OpenAI-compatible Client (Groq, OpenAI)
// ============================================================================

/// Client for any OpenAI-compatible chat-completions API
pub struct OpenAiCompatibleClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Choice {
    message: Message,
    finish_reason: Option<String>,
}

impl OpenAiCompatibleClient {
    /// Create a client for Groq's hosted models
    pub fn groq(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new(api_key, model, GROQ_BASE_URL)
    }

    /// Create a new client against `base_url`
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            max_tokens: 2048,
            temperature: 0.0,
        }
    }

    /// Create from config
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let (api_key, default_url, key_name) = match config.provider {
            LlmProvider::OpenAI => (&config.openai_api_key, OPENAI_BASE_URL, "OPENAI_API_KEY"),
            _ => (&config.groq_api_key, GROQ_BASE_URL, "GROQ_API_KEY"),
        };
        let api_key = api_key
            .as_ref()
            .ok_or_else(|| ConfigError::MissingRequired(key_name.to_string()))?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| default_url.to_string());

        Ok(Self::new(api_key.clone(), config.model.clone(), base_url)
            .with_sampling(config.max_tokens, config.temperature))
    }

    /// Set completion length and temperature
    pub fn with_sampling(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message::system(system), Message::user(user)],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CvError::UpstreamModel(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CvError::UpstreamModel(format!(
                "Chat completion returned {status}: {error_text}"
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| CvError::UpstreamModel(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| CvError::UpstreamModel("No response generated".to_string()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Ollama Client
// ============================================================================

/// Ollama API client
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct OllamaChatResponse {
    message: Message,
    done: bool,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    /// Create from config
    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(config.ollama_url.clone(), config.model.clone())
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let request = OllamaChatRequest {
            model: self.model.clone(),
            messages: vec![Message::system(system), Message::user(user)],
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| CvError::UpstreamModel(format!("Ollama request failed: {e}")))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CvError::UpstreamModel(format!("Ollama error: {error_text}")));
        }

        let result: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| CvError::UpstreamModel(format!("Failed to parse Ollama response: {e}")))?;

        Ok(result.message.content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Factory function
// ============================================================================

/// Create an LLM client from config
pub fn create_llm_client(config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    match config.provider {
        LlmProvider::Groq | LlmProvider::OpenAI => {
            Ok(Box::new(OpenAiCompatibleClient::from_config(config)?))
        }
        LlmProvider::Ollama => Ok(Box::new(OllamaClient::from_config(config))),
    }
}

// ============================================================================
// Tests
// ============================================================================
