//! In-memory vector store
//!
//! Brute-force cosine search over a map guarded by a `RwLock`. Backs local
//! runs without a Qdrant instance and the pipeline tests.

use async_trait::async_trait;
use cvsearch_core::{CvError, Result, ScoredRecord};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::Payload;

struct Collection {
    dimension: usize,
    points: HashMap<Uuid, (Vec<f32>, Payload)>,
}

/// Process-local vector store
#[derive(Default)]
pub struct InMemoryStore {
    collection: RwLock<Option<Collection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dimension of the collection, if it has been created
    pub async fn dimension(&self) -> Option<usize> {
        self.collection.read().await.as_ref().map(|c| c.dimension)
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.collection
            .read()
            .await
            .as_ref()
            .map(|c| c.points.len())
            .unwrap_or(0)
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Cosine similarity; zero-length vectors score 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl super::VectorStore for InMemoryStore {
    async fn ensure_collection(&self, dimension: usize) -> Result<()> {
        let mut collection = self.collection.write().await;
        if collection.is_none() {
            *collection = Some(Collection {
                dimension,
                points: HashMap::new(),
            });
            tracing::info!(dimension, "Created in-memory collection");
        }
        Ok(())
    }

    async fn upsert(&self, id: Uuid, vector: Vec<f32>, payload: Payload) -> Result<()> {
        let mut guard = self.collection.write().await;
        let collection = guard
            .as_mut()
            .ok_or_else(|| CvError::StoreWrite("Collection does not exist".to_string()))?;

        if vector.len() != collection.dimension {
            tracing::error!(resume_id = %id, "Error uploading resume: dimension mismatch");
            return Err(CvError::StoreWrite(format!(
                "Vector dimension error: expected dim: {}, got {}",
                collection.dimension,
                vector.len()
            )));
        }

        collection.points.insert(id, (vector, payload));
        tracing::info!(resume_id = %id, "Uploaded resume");
        Ok(())
    }

    async fn search(&self, query_vector: &[f32], top_k: usize) -> Result<Vec<ScoredRecord>> {
        let guard = self.collection.read().await;
        let collection = guard
            .as_ref()
            .ok_or_else(|| CvError::StoreSearch("Collection does not exist".to_string()))?;

        if query_vector.len() != collection.dimension {
            return Err(CvError::StoreSearch(format!(
                "Vector dimension error: expected dim: {}, got {}",
                collection.dimension,
                query_vector.len()
            )));
        }

        let mut scored: Vec<ScoredRecord> = collection
            .points
            .values()
            .map(|(vector, payload)| ScoredRecord {
                score: cosine_similarity(query_vector, vector),
                payload: payload.clone(),
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VectorStore;
    use serde_json::json;

    fn payload_for(id: Uuid, response: &str) -> Payload {
        let mut payload = Payload::new();
        payload.insert("id".to_string(), json!(id.to_string()));
        payload.insert("response".to_string(), json!(response));
        payload
    }

    fn unit(dimension: usize, hot: usize) -> Vec<f32> {
        let mut v = vec![0.0; dimension];
        v[hot] = 1.0;
        v
    }

    #[tokio::test]
    async fn test_ensure_collection_is_idempotent() {
        let store = InMemoryStore::new();
        store.ensure_collection(8).await.unwrap();
        let id = Uuid::new_v4();
        store.upsert(id, unit(8, 0), payload_for(id, "a")).await.unwrap();

        store.ensure_collection(8).await.unwrap();
        assert_eq!(store.dimension().await, Some(8));
        assert_eq!(store.len().await, 1);

        // An existing collection is not reconfigured
        store.ensure_collection(16).await.unwrap();
        assert_eq!(store.dimension().await, Some(8));
    }

    #[tokio::test]
    async fn test_requires_collection() {
        let store = InMemoryStore::new();
        let id = Uuid::new_v4();
        let err = store.upsert(id, unit(4, 0), Payload::new()).await.unwrap_err();
        assert!(matches!(err, CvError::StoreWrite(_)));

        let err = store.search(&unit(4, 0), 5).await.unwrap_err();
        assert!(matches!(err, CvError::StoreSearch(_)));
    }

    #[tokio::test]
    async fn test_rejects_wrong_dimension() {
        let store = InMemoryStore::new();
        store.ensure_collection(4).await.unwrap();
        let id = Uuid::new_v4();
        let err = store.upsert(id, unit(3, 0), Payload::new()).await.unwrap_err();
        assert!(matches!(err, CvError::StoreWrite(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_upsert_then_search_ranks_record_first() {
        let store = InMemoryStore::new();
        store.ensure_collection(4).await.unwrap();

        let target = Uuid::new_v4();
        let other = Uuid::new_v4();
        store
            .upsert(target, vec![0.9, 0.1, 0.0, 0.0], payload_for(target, "target"))
            .await
            .unwrap();
        store
            .upsert(other, vec![0.0, 0.0, 1.0, 0.0], payload_for(other, "other"))
            .await
            .unwrap();

        let results = store.search(&[0.88, 0.12, 0.0, 0.0], 5).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].resume_id(), Some(target.to_string()));
        assert!(results[0].score > results[1].score);
        assert!(results[0].score > 0.99);
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_id() {
        let store = InMemoryStore::new();
        store.ensure_collection(2).await.unwrap();
        let id = Uuid::new_v4();
        store.upsert(id, vec![1.0, 0.0], payload_for(id, "v1")).await.unwrap();
        store.upsert(id, vec![0.0, 1.0], payload_for(id, "v2")).await.unwrap();

        assert_eq!(store.len().await, 1);
        let results = store.search(&[0.0, 1.0], 5).await.unwrap();
        assert_eq!(results[0].display_text().as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn test_search_respects_top_k() {
        let store = InMemoryStore::new();
        store.ensure_collection(8).await.unwrap();
        for hot in 0..8 {
            let id = Uuid::new_v4();
            store
                .upsert(id, unit(8, hot), payload_for(id, &hot.to_string()))
                .await
                .unwrap();
        }

        let results = store.search(&unit(8, 3), 5).await.unwrap();
        assert_eq!(results.len(), 5);
        assert_eq!(results[0].display_text().as_deref(), Some("3"));
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
