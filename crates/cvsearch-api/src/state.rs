//! Application state management
//!
//! Author: hephaex@gmail.com

use crate::pipeline::{SearchPipeline, UploadPipeline};
use cvsearch_core::config::AppConfig;
use cvsearch_core::{LlmClient, Result};
use cvsearch_llm::create_llm_client;
use cvsearch_vector::{create_embedding_client, create_vector_store, EmbeddingClient, VectorStore};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
    /// Resume ingestion
    pub upload: UploadPipeline,
    /// Resume search
    pub search: SearchPipeline,
}

impl AppState {
    /// Create application state from already-constructed clients
    pub fn new(
        config: AppConfig,
        llm: Arc<dyn LlmClient>,
        embedder: Arc<dyn EmbeddingClient>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        let upload = UploadPipeline::new(llm, Arc::clone(&embedder), Arc::clone(&store));
        let search = SearchPipeline::new(embedder, store, config.search.top_k);

        Self {
            config,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            upload,
            search,
        }
    }

    /// Build the external clients from config and make sure the collection exists
    pub async fn initialize(config: AppConfig) -> Result<Self> {
        let llm: Arc<dyn LlmClient> = Arc::from(create_llm_client(&config.llm)?);
        tracing::info!(model = llm.model(), "LLM client initialized");

        let embedder: Arc<dyn EmbeddingClient> =
            Arc::from(create_embedding_client(&config.embedding)?);
        tracing::info!(
            model = %config.embedding.model,
            dimension = embedder.dimension(),
            "Embedding client initialized"
        );

        let store = create_vector_store(&config.vector_store).await?;
        store
            .ensure_collection(config.vector_store.vector_dimension)
            .await?;

        Ok(Self::new(config, llm, embedder, store))
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
