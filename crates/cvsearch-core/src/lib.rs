//! cvsearch Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout cvsearch:
//! - Resume records and the structured profile extracted by the LLM
//! - Search hits returned to API clients
//! - Common error types
//! - The chat-completion client trait
//! - Configuration management

pub mod config;

pub use config::{
    AppConfig, ConfigError, EmbeddingConfig, EmbeddingProvider, LlmConfig, LlmProvider,
    LoggingConfig, SearchConfig, ServerConfig, VectorBackend, VectorStoreConfig,
};

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for cvsearch operations
#[derive(Error, Debug)]
pub enum CvError {
    #[error("Unsupported file type: {0}. Upload PDF or DOCX.")]
    UnsupportedFormat(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Language model error: {0}")]
    UpstreamModel(String),

    #[error("Embedding error: {0}")]
    UpstreamEmbedding(String),

    #[error("Vector store write failed: {0}")]
    StoreWrite(String),

    #[error("Vector store search failed: {0}")]
    StoreSearch(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CvError {
    /// Whether the error was caused by the client's input rather than a collaborator
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat(_) | Self::Extraction(_) | Self::Validation(_)
        )
    }
}

impl From<ConfigError> for CvError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CvError>;

// ============================================================================
// Resume Models
// ============================================================================

/// Fields the structuring prompt asks the model for.
///
/// Every field is optional: the model output is never validated, so this is
/// only populated when the raw response happens to be a JSON object. Keys are
/// matched in both the lower-case form the prompt requests and the capitalised
/// form its example shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeProfile {
    #[serde(
        default,
        alias = "Name",
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,

    #[serde(default, alias = "Age", skip_serializing_if = "Option::is_none")]
    pub age: Option<serde_json::Value>,

    #[serde(
        default,
        alias = "Role",
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<String>,

    /// Usually strings; other item shapes are kept as given
    #[serde(
        default,
        alias = "Skills",
        deserialize_with = "lenient_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub skills: Vec<serde_json::Value>,

    #[serde(default, alias = "Experience", skip_serializing_if = "Option::is_none")]
    pub experience: Option<serde_json::Value>,

    #[serde(default, alias = "Projects", skip_serializing_if = "Option::is_none")]
    pub projects: Option<serde_json::Value>,

    #[serde(default, alias = "Education", skip_serializing_if = "Option::is_none")]
    pub education: Option<serde_json::Value>,

    #[serde(default, alias = "Certifications", skip_serializing_if = "Option::is_none")]
    pub certifications: Option<serde_json::Value>,

    #[serde(
        default,
        alias = "Languages",
        deserialize_with = "lenient_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub languages: Vec<serde_json::Value>,

    #[serde(default, alias = "Location", skip_serializing_if = "Option::is_none")]
    pub location: Option<serde_json::Value>,

    #[serde(
        default,
        alias = "Contact_info",
        alias = "ContactInfo",
        alias = "contact",
        skip_serializing_if = "Option::is_none"
    )]
    pub contact_info: Option<serde_json::Value>,
}

/// Strings and numbers become text; null and other shapes are dropped
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Null is an empty list and a lone value is a list of one
fn lenient_list<'de, D>(deserializer: D) -> std::result::Result<Vec<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Vec::new(),
        serde_json::Value::Array(items) => items.into_iter().filter(|v| !v.is_null()).collect(),
        other => vec![other],
    })
}

/// The canonical stored entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeRecord {
    /// Generated once per upload
    pub id: Uuid,

    /// Raw structuring output, stored verbatim
    pub response: String,

    /// Parsed fields, when the raw output was a JSON object
    pub profile: Option<ResumeProfile>,
}

/// Text that is embedded for a record: `{"response": ..., "id": ...}`
#[derive(Serialize)]
struct EmbeddingDocument<'a> {
    response: &'a str,
    id: String,
}

impl ResumeRecord {
    /// Create a record with a freshly generated identifier
    pub fn new(response: impl Into<String>, profile: Option<ResumeProfile>) -> Self {
        Self {
            id: Uuid::new_v4(),
            response: response.into(),
            profile,
        }
    }

    /// Serialize the record into the text handed to the embedding model
    pub fn embedding_text(&self) -> Result<String> {
        let doc = EmbeddingDocument {
            response: &self.response,
            id: self.id.to_string(),
        };
        serde_json::to_string(&doc).map_err(|e| CvError::Other(e.into()))
    }

    /// Build the key-value payload stored next to the vector.
    ///
    /// Profile fields are flattened next to `id` and `response`; they never
    /// overwrite those two keys.
    pub fn payload(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        let mut payload = serde_json::Map::new();

        if let Some(profile) = &self.profile {
            let value = serde_json::to_value(profile).map_err(|e| CvError::Other(e.into()))?;
            if let serde_json::Value::Object(fields) = value {
                payload.extend(fields);
            }
        }

        payload.insert(
            "response".to_string(),
            serde_json::Value::String(self.response.clone()),
        );
        payload.insert(
            "id".to_string(),
            serde_json::Value::String(self.id.to_string()),
        );

        Ok(payload)
    }
}

// ============================================================================
// Search Models
// ============================================================================

/// Payload keys tried, in order, when picking the text shown for a hit
pub const DISPLAY_FIELDS: [&str; 3] = ["response", "text", "name"];

/// A scored record as returned by the vector store
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub score: f32,
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl ScoredRecord {
    /// First present string field among [`DISPLAY_FIELDS`]
    pub fn display_text(&self) -> Option<String> {
        DISPLAY_FIELDS.iter().find_map(|key| {
            self.payload
                .get(*key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        })
    }

    /// Resume identifier stored in the payload
    pub fn resume_id(&self) -> Option<String> {
        self.payload
            .get("id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }
}

/// One ranked search result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub score: f32,
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<String>,
}

impl From<ScoredRecord> for SearchHit {
    fn from(record: ScoredRecord) -> Self {
        Self {
            score: record.score,
            response: record.display_text(),
            resume_id: record.resume_id(),
        }
    }
}

// ============================================================================
// Embedding Mode
// ============================================================================

/// Which side of the search an embedding is produced for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingMode {
    /// Indexing a stored record
    Document,
    /// Embedding a search query
    Query,
}

impl std::fmt::Display for EmbeddingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Document => write!(f, "document"),
            Self::Query => write!(f, "query"),
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Trait for chat-completion clients
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one system instruction and one user turn, returning the raw reply
    async fn chat(&self, system: &str, user: &str) -> Result<String>;

    /// Model identifier, for logging
    fn model(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_ids_are_unique() {
        let a = ResumeRecord::new("{}", None);
        let b = ResumeRecord::new("{}", None);
        assert_ne!(a.id, b.id);
        assert!(!a.id.to_string().is_empty());
    }

    #[test]
    fn test_embedding_text_contains_response_and_id() {
        let record = ResumeRecord::new("{\"name\": \"John Doe\"}", None);
        let text = record.embedding_text().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed["response"], "{\"name\": \"John Doe\"}");
        assert_eq!(parsed["id"], record.id.to_string());
        assert!(text.starts_with("{\"response\""));
    }

    #[test]
    fn test_payload_keeps_id_and_response_authoritative() {
        let profile = ResumeProfile {
            name: Some("Jane".to_string()),
            skills: vec![json!("Rust")],
            ..Default::default()
        };
        let record = ResumeRecord::new("raw output", Some(profile));
        let payload = record.payload().unwrap();

        assert_eq!(payload["id"], json!(record.id.to_string()));
        assert_eq!(payload["response"], json!("raw output"));
        assert_eq!(payload["name"], json!("Jane"));
        assert_eq!(payload["skills"], json!(["Rust"]));
        assert!(!payload.contains_key("age"));
    }

    #[test]
    fn test_profile_accepts_capitalised_keys() {
        let profile: ResumeProfile = serde_json::from_value(json!({
            "Name": "John Doe",
            "Role": "Software Engineer",
            "Skills": ["Python", "Go"]
        }))
        .unwrap();

        assert_eq!(profile.name.as_deref(), Some("John Doe"));
        assert_eq!(profile.role.as_deref(), Some("Software Engineer"));
        assert_eq!(profile.skills, vec!["Python", "Go"]);
    }

    #[test]
    fn test_profile_tolerates_null_lists() {
        let profile: ResumeProfile = serde_json::from_value(json!({
            "name": "John Doe",
            "skills": ["Python", "Go"],
            "languages": null,
            "location": null
        }))
        .unwrap();

        assert_eq!(profile.name.as_deref(), Some("John Doe"));
        assert_eq!(profile.skills, vec!["Python", "Go"]);
        assert!(profile.languages.is_empty());
    }

    #[test]
    fn test_profile_keeps_object_list_items() {
        let profile: ResumeProfile = serde_json::from_value(json!({
            "name": {"first": "John", "last": "Doe"},
            "role": null,
            "languages": [{"language": "English", "proficiency": "Fluent"}],
            "skills": "Python"
        }))
        .unwrap();

        assert!(profile.name.is_none());
        assert!(profile.role.is_none());
        assert_eq!(
            profile.languages,
            vec![json!({"language": "English", "proficiency": "Fluent"})]
        );
        assert_eq!(profile.skills, vec!["Python"]);
    }

    #[test]
    fn test_display_text_priority() {
        let mut payload = serde_json::Map::new();
        payload.insert("name".to_string(), json!("Name only"));
        let record = ScoredRecord {
            score: 0.5,
            payload: payload.clone(),
        };
        assert_eq!(record.display_text().as_deref(), Some("Name only"));

        payload.insert("text".to_string(), json!("Text field"));
        payload.insert("response".to_string(), json!("Response field"));
        let record = ScoredRecord { score: 0.5, payload };
        assert_eq!(record.display_text().as_deref(), Some("Response field"));
    }

    #[test]
    fn test_search_hit_without_display_fields() {
        let record = ScoredRecord {
            score: 0.25,
            payload: serde_json::Map::new(),
        };
        let hit = SearchHit::from(record);
        assert_eq!(hit.score, 0.25);
        assert!(hit.response.is_none());

        let json = serde_json::to_value(&hit).unwrap();
        assert!(json["response"].is_null());
        assert!(json.get("resume_id").is_none());
    }

    #[test]
    fn test_client_error_classification() {
        assert!(CvError::UnsupportedFormat("txt".into()).is_client_error());
        assert!(CvError::Validation("empty".into()).is_client_error());
        assert!(!CvError::StoreWrite("down".into()).is_client_error());
        assert!(!CvError::UpstreamModel("500".into()).is_client_error());
    }

    #[test]
    fn test_embedding_mode_display() {
        assert_eq!(EmbeddingMode::Document.to_string(), "document");
        assert_eq!(EmbeddingMode::Query.to_string(), "query");
    }
}
