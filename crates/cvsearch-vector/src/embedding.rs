//! Embedding client for generating vector representations
//!
//! Supports Cohere (document/query aware) and OpenAI embedding APIs. Every
//! call embeds exactly one text and checks the vector length against the
//! configured dimension.
//!
//! Author: hephaex@gmail.com

use async_trait::async_trait;
use cvsearch_core::{
    ConfigError, CvError, EmbeddingConfig, EmbeddingMode, EmbeddingProvider, Result,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const COHERE_BASE_URL: &str = "https://api.cohere.com";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

// ============================================================================
// Embedding Trait
// ============================================================================

/// Trait for embedding generation
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Generate the embedding of one text for indexing or for querying
    async fn embed(&self, text: &str, mode: EmbeddingMode) -> Result<Vec<f32>>;

    /// Get embedding dimension
    fn dimension(&self) -> usize;
}

/// Reject vectors that would not fit the collection
fn check_dimension(vector: Vec<f32>, expected: usize) -> Result<Vec<f32>> {
    if vector.len() != expected {
        return Err(CvError::UpstreamEmbedding(format!(
            "Expected {expected}-dimensional embedding, got {}",
            vector.len()
        )));
    }
    Ok(vector)
}

// ============================================================================
// Cohere Embedding Client
// ============================================================================

/// Cohere embed v2 API client
pub struct CohereEmbedding {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct CohereEmbedRequest<'a> {
    model: &'a str,
    texts: [&'a str; 1],
    input_type: &'static str,
    embedding_types: [&'static str; 1],
    output_dimension: usize,
}

#[derive(Debug, Deserialize)]
struct CohereEmbedResponse {
    embeddings: CohereEmbeddings,
}

#[derive(Debug, Deserialize)]
struct CohereEmbeddings {
    #[serde(default)]
    float: Vec<Vec<f32>>,
}

impl CohereEmbedding {
    /// Create a new Cohere embedding client
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, dimension: usize) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: COHERE_BASE_URL.to_string(),
            model: model.into(),
            dimension,
        }
    }

    /// Create from config
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = config
            .cohere_api_key
            .as_ref()
            .ok_or_else(|| ConfigError::MissingRequired("COHERE_API_KEY".to_string()))?;

        let mut client = Self::new(api_key.clone(), config.model.clone(), config.dimension);
        if let Some(url) = &config.base_url {
            client = client.with_base_url(url.clone());
        }
        Ok(client)
    }

    /// Set custom base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn input_type(mode: EmbeddingMode) -> &'static str {
        match mode {
            EmbeddingMode::Document => "search_document",
            EmbeddingMode::Query => "search_query",
        }
    }
}

#[async_trait]
impl EmbeddingClient for CohereEmbedding {
    async fn embed(&self, text: &str, mode: EmbeddingMode) -> Result<Vec<f32>> {
        let request = CohereEmbedRequest {
            model: &self.model,
            texts: [text],
            input_type: Self::input_type(mode),
            embedding_types: ["float"],
            output_dimension: self.dimension,
        };

        let response = self
            .client
            .post(format!("{}/v2/embed", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CvError::UpstreamEmbedding(format!("Embedding request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CvError::UpstreamEmbedding(format!(
                "Cohere embedding returned {status}: {error_text}"
            )));
        }

        let result: CohereEmbedResponse = response.json().await.map_err(|e| {
            CvError::UpstreamEmbedding(format!("Failed to parse embedding response: {e}"))
        })?;

        let vector = result
            .embeddings
            .float
            .into_iter()
            .next()
            .ok_or_else(|| CvError::UpstreamEmbedding("No embedding returned".to_string()))?;

        check_dimension(vector, self.dimension)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

// ============================================================================
// OpenAI Embedding Client
// ============================================================================

/// OpenAI embedding API client; the same representation serves both modes
pub struct OpenAiEmbedding {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct OpenAiEmbeddingRequest<'a> {
    input: [&'a str; 1],
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbedding {
    /// Create a new OpenAI embedding client
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, dimension: usize) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_string(),
            model: model.into(),
            dimension,
        }
    }

    /// Create from config
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ConfigError::MissingRequired("OPENAI_API_KEY".to_string()))?;

        let mut client = Self::new(api_key.clone(), config.model.clone(), config.dimension);
        if let Some(url) = &config.base_url {
            client = client.with_base_url(url.clone());
        }
        Ok(client)
    }

    /// Set custom base URL (for Azure or compatible APIs)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Only the text-embedding-3 family accepts a requested dimension
    fn requested_dimensions(&self) -> Option<usize> {
        self.model
            .starts_with("text-embedding-3")
            .then_some(self.dimension)
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbedding {
    async fn embed(&self, text: &str, _mode: EmbeddingMode) -> Result<Vec<f32>> {
        let request = OpenAiEmbeddingRequest {
            input: [text],
            model: &self.model,
            dimensions: self.requested_dimensions(),
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CvError::UpstreamEmbedding(format!("Embedding request failed: {e}")))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CvError::UpstreamEmbedding(format!(
                "OpenAI embedding error: {error_text}"
            )));
        }

        let result: OpenAiEmbeddingResponse = response.json().await.map_err(|e| {
            CvError::UpstreamEmbedding(format!("Failed to parse embedding response: {e}"))
        })?;

        let vector = result
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| CvError::UpstreamEmbedding("No embedding returned".to_string()))?;

        check_dimension(vector, self.dimension)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

// ============================================================================
// Factory function
// ============================================================================

/// Create an embedding client from config
pub fn create_embedding_client(config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingClient>> {
    match config.provider {
        EmbeddingProvider::Cohere => Ok(Box::new(CohereEmbedding::from_config(config)?)),
        EmbeddingProvider::OpenAI => Ok(Box::new(OpenAiEmbedding::from_config(config)?)),
    }
}

// ============================================================================
// Tests
// ============================================================================
