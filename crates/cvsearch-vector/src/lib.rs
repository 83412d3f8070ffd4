//! cvsearch Vector - Embeddings and vector storage
//!
//! Provides the embedding clients used for indexing and querying, and the
//! gateway over the vector database (Qdrant, or an in-memory store for local
//! runs) that holds one vector per resume.

use async_trait::async_trait;
use cvsearch_core::{Result, ScoredRecord, VectorBackend, VectorStoreConfig};
use std::sync::Arc;
use uuid::Uuid;

pub mod embedding;
pub mod memory_store;
pub mod qdrant_store;

pub use embedding::{create_embedding_client, CohereEmbedding, EmbeddingClient, OpenAiEmbedding};
pub use memory_store::InMemoryStore;
pub use qdrant_store::QdrantStore;

/// Key-value payload stored next to each vector
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Trait for vector database operations
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the collection with cosine distance if it does not exist yet
    async fn ensure_collection(&self, dimension: usize) -> Result<()>;

    /// Insert or replace the record stored at `id`
    async fn upsert(&self, id: Uuid, vector: Vec<f32>, payload: Payload) -> Result<()>;

    /// Nearest records by descending similarity, at most `top_k`
    async fn search(&self, query_vector: &[f32], top_k: usize) -> Result<Vec<ScoredRecord>>;
}

/// Connect the configured vector store
pub async fn create_vector_store(config: &VectorStoreConfig) -> Result<Arc<dyn VectorStore>> {
    match config.backend {
        VectorBackend::Qdrant => Ok(Arc::new(QdrantStore::new(config)?)),
        VectorBackend::Memory => {
            tracing::warn!("Using in-memory vector store; resumes are lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}
