//! Upload and search pipelines
//!
//! Both pipelines run their steps sequentially and attempt every external
//! call once. Nothing is written to the vector store until every earlier
//! step has succeeded, so a failed upload leaves no partial state.
//!
//! Author: hephaex@gmail.com

use cvsearch_core::{CvError, EmbeddingMode, LlmClient, ResumeRecord, Result, SearchHit};
use cvsearch_llm::{parse_profile, ResumeStructurer};
use cvsearch_parser::ParserRegistry;
use cvsearch_vector::{EmbeddingClient, VectorStore};
use std::sync::Arc;

/// extract -> structure -> embed (document) -> upsert
pub struct UploadPipeline {
    parsers: Arc<ParserRegistry>,
    structurer: ResumeStructurer,
    embedder: Arc<dyn EmbeddingClient>,
    store: Arc<dyn VectorStore>,
}

impl UploadPipeline {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        embedder: Arc<dyn EmbeddingClient>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            parsers: Arc::new(ParserRegistry::with_defaults()),
            structurer: ResumeStructurer::new(llm),
            embedder,
            store,
        }
    }

    /// Extract text off the async runtime; PDF parsing is CPU-bound
    async fn extract(&self, filename: &str, bytes: Vec<u8>) -> Result<String> {
        let parsers = Arc::clone(&self.parsers);
        let filename = filename.to_string();

        let text = tokio::task::spawn_blocking(move || parsers.extract(&bytes, &filename))
            .await
            .map_err(|e| CvError::Extraction(format!("Extraction task failed: {e}")))??;

        Ok(text)
    }

    /// Store one uploaded resume and return the stored record
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn run(&self, filename: &str, bytes: Vec<u8>) -> Result<ResumeRecord> {
        let text = self.extract(filename, bytes).await?;
        if text.trim().is_empty() {
            tracing::warn!("No text could be extracted from the document");
        }

        let raw = self.structurer.structure(&text).await?;
        let profile = parse_profile(&raw);
        if profile.is_none() {
            tracing::warn!("Model output is not a JSON object; storing it verbatim");
        }

        let record = ResumeRecord::new(raw, profile);
        tracing::debug!(resume_id = %record.id, "Structured resume");

        let embedding_text = record.embedding_text()?;
        let vector = self
            .embedder
            .embed(&embedding_text, EmbeddingMode::Document)
            .await?;
        tracing::debug!(resume_id = %record.id, dimension = vector.len(), "Embedded resume");

        self.store
            .upsert(record.id, vector, record.payload()?)
            .await?;

        Ok(record)
    }
}

/// embed (query) -> nearest-neighbour search
pub struct SearchPipeline {
    embedder: Arc<dyn EmbeddingClient>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl SearchPipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingClient>,
        store: Arc<dyn VectorStore>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            top_k,
        }
    }

    /// Rank stored resumes against a free-text query
    #[tracing::instrument(skip(self))]
    pub async fn run(&self, query: &str) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(CvError::Validation("Query must not be empty".to_string()));
        }

        let vector = self.embedder.embed(query, EmbeddingMode::Query).await?;
        let results = self.store.search(&vector, self.top_k).await?;
        tracing::debug!(hits = results.len(), "Search completed");

        Ok(results.into_iter().map(SearchHit::from).collect())
    }
}
