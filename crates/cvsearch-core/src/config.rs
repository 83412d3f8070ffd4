//! cvsearch Configuration Management
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment variables (a `.env` file is loaded first if present).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable naming an optional TOML config file
pub const CONFIG_FILE_ENV: &str = "CVSEARCH_CONFIG";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Vector database connection
    pub vector_store: VectorStoreConfig,

    /// Language model used to structure resumes
    pub llm: LlmConfig,

    /// Embedding model configuration
    pub embedding: EmbeddingConfig,

    /// Search behaviour
    pub search: SearchConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load defaults, then the file named by `CVSEARCH_CONFIG`, then the environment
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) => Self::from_file(path)?.with_env_override(),
            Err(_) => Self::from_env(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_override()
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        self.apply_vars(|key| std::env::var(key).ok())?;
        Ok(self)
    }

    /// Override fields from a variable lookup; unset keys leave values untouched
    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(host) = lookup("API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("API_PORT") {
            self.server.port = parse_var("API_PORT", port)?;
        }
        if let Some(size) = lookup("MAX_UPLOAD_BYTES") {
            self.server.max_body_size = parse_var("MAX_UPLOAD_BYTES", size)?;
        }
        // CORS origins from environment variable (comma-separated)
        if let Some(origins) = lookup("CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Vector store
        if let Some(backend) = lookup("VECTOR_BACKEND") {
            self.vector_store.backend = backend.parse()?;
        }
        if let Some(url) = lookup("QDRANT_URL") {
            self.vector_store.qdrant_url = url;
        }
        if let Some(key) = lookup("QDRANT_API_KEY") {
            self.vector_store.qdrant_api_key = Some(key).filter(|k| !k.is_empty());
        }
        if let Some(collection) = lookup("QDRANT_COLLECTION") {
            self.vector_store.collection = collection;
        }
        if let Some(dimension) = lookup("VECTOR_DIMENSION") {
            self.vector_store.vector_dimension = parse_var("VECTOR_DIMENSION", dimension)?;
        }

        // LLM
        if let Some(provider) = lookup("LLM_PROVIDER") {
            self.llm.provider = provider.parse()?;
        }
        if let Some(key) = lookup("GROQ_API_KEY") {
            self.llm.groq_api_key = Some(key);
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.llm.openai_api_key = Some(key.clone());
            self.embedding.openai_api_key = Some(key);
        }
        if let Some(url) = lookup("LLM_BASE_URL") {
            self.llm.base_url = Some(url);
        }
        if let Some(url) = lookup("OLLAMA_URL") {
            self.llm.ollama_url = url;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = model;
        }

        // Embedding
        if let Some(provider) = lookup("EMBEDDING_PROVIDER") {
            self.embedding.provider = provider.parse()?;
        }
        if let Some(key) = lookup("COHERE_API_KEY") {
            self.embedding.cohere_api_key = Some(key);
        }
        if let Some(model) = lookup("EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Some(url) = lookup("EMBEDDING_BASE_URL") {
            self.embedding.base_url = Some(url);
        }

        // Search
        if let Some(top_k) = lookup("SEARCH_TOP_K") {
            self.search.top_k = parse_var("SEARCH_TOP_K", top_k)?;
        }

        // Logging
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.json_format = format.eq_ignore_ascii_case("json");
        }

        // The embedding model and the collection must agree on dimensionality
        self.embedding.dimension = self.vector_store.vector_dimension;

        Ok(())
    }

    /// Socket address string the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum request body size in bytes
    pub max_body_size: usize,

    /// Enable CORS
    pub cors_enabled: bool,

    /// Allowed origins for CORS; empty means any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_body_size: 10 * 1024 * 1024, // 10MB
            cors_enabled: true,
            cors_origins: vec![],
        }
    }
}

/// Which vector store implementation backs the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackend {
    Qdrant,
    /// Process-local store, lost on restart
    Memory,
}

impl std::str::FromStr for VectorBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "qdrant" => Ok(Self::Qdrant),
            "memory" | "in-memory" => Ok(Self::Memory),
            _ => Err(ConfigError::InvalidValue {
                key: "VECTOR_BACKEND".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Vector database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    /// Store implementation
    pub backend: VectorBackend,

    /// Qdrant gRPC URL
    pub qdrant_url: String,

    /// Qdrant Cloud API key
    pub qdrant_api_key: Option<String>,

    /// Collection holding resume vectors
    pub collection: String,

    /// Vector dimension (must match embedding model)
    pub vector_dimension: usize,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            backend: VectorBackend::Qdrant,
            qdrant_url: "http://localhost:6334".to_string(),
            qdrant_api_key: None,
            collection: "resumes".to_string(),
            vector_dimension: 1536, // Cohere embed-v4.0
        }
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// LLM provider to use
    pub provider: LlmProvider,

    /// Groq API key
    pub groq_api_key: Option<String>,

    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// Override for the chat-completions base URL
    pub base_url: Option<String>,

    /// Ollama server URL
    pub ollama_url: String,

    /// Model name to use
    pub model: String,

    /// Maximum tokens for completion
    pub max_tokens: u32,

    /// Temperature for generation
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Groq,
            groq_api_key: None,
            openai_api_key: None,
            base_url: None,
            ollama_url: "http://localhost:11434".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            max_tokens: 2048,
            temperature: 0.0,
        }
    }
}

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Groq,
    OpenAI,
    Ollama,
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            _ => Err(ConfigError::InvalidValue {
                key: "LLM_PROVIDER".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding provider to use
    pub provider: EmbeddingProvider,

    /// Cohere API key
    pub cohere_api_key: Option<String>,

    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// Override for the provider base URL
    pub base_url: Option<String>,

    /// Embedding model name
    pub model: String,

    /// Expected vector length
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Cohere,
            cohere_api_key: None,
            openai_api_key: None,
            base_url: None,
            model: "embed-v4.0".to_string(),
            dimension: 1536,
        }
    }
}

/// Supported embedding providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    Cohere,
    OpenAI,
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cohere" => Ok(Self::Cohere),
            "openai" => Ok(Self::OpenAI),
            _ => Err(ConfigError::InvalidValue {
                key: "EMBEDDING_PROVIDER".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of nearest records returned per query
    pub top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.vector_store.vector_dimension, 1536);
        assert_eq!(config.vector_store.collection, "resumes");
        assert_eq!(config.embedding.model, "embed-v4.0");
        assert_eq!(config.search.top_k, 5);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_env_override() {
        let mut config = AppConfig::default();
        config
            .apply_vars(lookup_from(&[
                ("QDRANT_URL", "https://cluster.cloud.qdrant.io:6334"),
                ("QDRANT_API_KEY", "qdrant-secret"),
                ("COHERE_API_KEY", "co-key"),
                ("GROQ_API_KEY", "groq-key"),
                ("API_PORT", "9090"),
                ("VECTOR_DIMENSION", "1024"),
                ("CORS_ORIGINS", "http://a.test, ,http://b.test"),
                ("LOG_FORMAT", "JSON"),
            ]))
            .unwrap();

        assert_eq!(
            config.vector_store.qdrant_url,
            "https://cluster.cloud.qdrant.io:6334"
        );
        assert_eq!(
            config.vector_store.qdrant_api_key.as_deref(),
            Some("qdrant-secret")
        );
        assert_eq!(config.embedding.cohere_api_key.as_deref(), Some("co-key"));
        assert_eq!(config.llm.groq_api_key.as_deref(), Some("groq-key"));
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.vector_store.vector_dimension, 1024);
        assert_eq!(config.embedding.dimension, 1024);
        assert_eq!(config.server.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert!(config.logging.json_format);
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut config = AppConfig::default();
        let err = config
            .apply_vars(lookup_from(&[("API_PORT", "not-a-port")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "API_PORT"));
    }

    #[test]
    fn test_empty_qdrant_key_is_none() {
        let mut config = AppConfig::default();
        config
            .apply_vars(lookup_from(&[("QDRANT_API_KEY", "")]))
            .unwrap();
        assert!(config.vector_store.qdrant_api_key.is_none());
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!("groq".parse::<LlmProvider>().unwrap(), LlmProvider::Groq);
        assert_eq!("OpenAI".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAI);
        assert!("invalid".parse::<LlmProvider>().is_err());

        assert_eq!(
            "cohere".parse::<EmbeddingProvider>().unwrap(),
            EmbeddingProvider::Cohere
        );
        assert_eq!(
            "memory".parse::<VectorBackend>().unwrap(),
            VectorBackend::Memory
        );
        assert!("sqlite".parse::<VectorBackend>().is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            port = 8081

            [vector_store]
            collection = "candidates"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.vector_store.collection, "candidates");
        assert_eq!(config.vector_store.vector_dimension, 1536);
    }
}
