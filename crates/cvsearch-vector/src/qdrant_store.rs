//! Qdrant implementation for vector storage
//!
//! Provides connection management and vector operations for resume
//! embeddings kept in a single named collection.
//!
//! Author: hephaex@gmail.com

use async_trait::async_trait;
use cvsearch_core::{CvError, Result, ScoredRecord, VectorStoreConfig};
use qdrant_client::qdrant::{
    value::Kind, CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use std::collections::HashMap;
use uuid::Uuid;

use crate::Payload;

/// Qdrant vector store implementation
pub struct QdrantStore {
    client: Qdrant,
    collection: String,
}

impl QdrantStore {
    /// Create a new Qdrant connection
    pub fn new(config: &VectorStoreConfig) -> Result<Self> {
        let mut builder = Qdrant::from_url(&config.qdrant_url);
        if let Some(api_key) = &config.qdrant_api_key {
            builder = builder.api_key(api_key.clone());
        }

        let client = builder
            .build()
            .map_err(|e| CvError::Config(format!("Qdrant connection failed: {e}")))?;

        Ok(Self {
            client,
            collection: config.collection.clone(),
        })
    }
}

/// Convert a stored payload value back into JSON
fn value_to_json(value: Value) -> serde_json::Value {
    match value.kind {
        None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(Kind::IntegerValue(i)) => serde_json::Value::from(i),
        Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(d)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Some(Kind::StringValue(s)) => serde_json::Value::String(s),
        Some(Kind::ListValue(list)) => {
            serde_json::Value::Array(list.values.into_iter().map(value_to_json).collect())
        }
        Some(Kind::StructValue(st)) => serde_json::Value::Object(
            st.fields
                .into_iter()
                .map(|(k, v)| (k, value_to_json(v)))
                .collect(),
        ),
    }
}

#[async_trait]
impl super::VectorStore for QdrantStore {
    async fn ensure_collection(&self, dimension: usize) -> Result<()> {
        // Check if collection exists
        let collections =
            self.client.list_collections().await.map_err(|e| {
                CvError::StoreWrite(format!("Failed to list collections: {e}"))
            })?;

        let exists = collections
            .collections
            .iter()
            .any(|c| c.name == self.collection);

        if exists {
            // The existing vector size is not compared against `dimension`
            tracing::info!(collection = %self.collection, "Collection already exists");
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(dimension as u64, Distance::Cosine)),
            )
            .await
            .map_err(|e| CvError::StoreWrite(format!("Failed to create collection: {e}")))?;

        tracing::info!(
            collection = %self.collection,
            dimension,
            "Created collection"
        );
        Ok(())
    }

    async fn upsert(&self, id: Uuid, vector: Vec<f32>, payload: Payload) -> Result<()> {
        let payload_map: HashMap<String, Value> =
            payload.into_iter().map(|(k, v)| (k, v.into())).collect();

        let point = PointStruct::new(id.to_string(), vector, payload_map);

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]).wait(true))
            .await
            .map_err(|e| {
                tracing::error!(resume_id = %id, error = %e, "Error uploading resume");
                CvError::StoreWrite(format!("Failed to upsert vector: {e}"))
            })?;

        tracing::info!(resume_id = %id, "Uploaded resume");
        Ok(())
    }

    async fn search(&self, query_vector: &[f32], top_k: usize) -> Result<Vec<ScoredRecord>> {
        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, query_vector.to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| CvError::StoreSearch(format!("Vector search failed: {e}")))?;

        Ok(results
            .result
            .into_iter()
            .map(|point| ScoredRecord {
                score: point.score,
                payload: point
                    .payload
                    .into_iter()
                    .map(|(k, v)| (k, value_to_json(v)))
                    .collect(),
            })
            .collect())
    }
}
