//! Qdrant vector store adapter.

use crate::config::StorageConfig;
use crate::store::{ChunkRecord, RetrievedChunk, VectorStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use qdrant_client::{
    qdrant::{
        point_id::PointIdOptions, vectors_config::Config, CreateCollectionBuilder, Distance,
        PointId, PointStruct, SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
        VectorsConfig,
    },
    Qdrant,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// Qdrant-backed chunk store.
///
/// The collection is created lazily with cosine distance on first use.
/// Chunk UUIDs double as Qdrant point ids, so re-adding a record under the
/// same id replaces the point instead of duplicating it.
#[derive(Clone)]
pub struct QdrantStore {
    client: Arc<Qdrant>,
    collection_name: String,
    vector_size: u64,
}

impl QdrantStore {
    /// Connects to the Qdrant server and ensures the collection exists.
    pub async fn new(config: &StorageConfig, vector_size: u64) -> Result<Self> {
        let client = Arc::new(
            Qdrant::from_url(&config.url)
                .build()
                .context("Failed to connect to Qdrant server")?,
        );

        let store = Self {
            client,
            collection_name: config.collection_name.clone(),
            vector_size,
        };
        store.ensure_collection().await?;

        Ok(store)
    }

    async fn ensure_collection(&self) -> Result<()> {
        let exists = self
            .client
            .collection_exists(&self.collection_name)
            .await
            .context("Failed to check collection")?;

        if !exists {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection_name).vectors_config(
                        VectorsConfig {
                            config: Some(Config::Params(
                                VectorParamsBuilder::new(self.vector_size, Distance::Cosine)
                                    .build(),
                            )),
                        },
                    ),
                )
                .await
                .context("Failed to create collection")?;
        }

        Ok(())
    }
}

fn point_id_to_string(id: PointId) -> String {
    match id.point_id_options {
        Some(PointIdOptions::Uuid(uuid)) => uuid,
        Some(PointIdOptions::Num(num)) => num.to_string(),
        None => String::new(),
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn add(&self, records: Vec<ChunkRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = records
            .into_iter()
            .map(|record| {
                let payload: HashMap<String, serde_json::Value> = record
                    .metadata
                    .iter()
                    .map(|(k, v)| (k.clone(), json!(v)))
                    .chain(vec![("text".to_string(), json!(record.text))])
                    .collect();

                PointStruct::new(record.id, record.embedding, payload)
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection_name, points))
            .await
            .context("Failed to upsert points")?;

        Ok(())
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<RetrievedChunk>> {
        let search_result = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection_name, embedding.to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .context("Failed to search points")?;

        let results = search_result
            .result
            .into_iter()
            .map(|point| {
                let id = point.id.map(point_id_to_string).unwrap_or_default();
                let payload = point.payload;

                let text = payload
                    .get("text")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
                    .unwrap_or_default();

                let metadata: HashMap<String, String> = payload
                    .iter()
                    .filter(|(k, _)| k.as_str() != "text")
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect();

                RetrievedChunk {
                    id,
                    text,
                    score: point.score,
                    metadata,
                }
            })
            .collect();

        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        let info = self
            .client
            .collection_info(&self.collection_name)
            .await
            .context("Failed to get collection info")?;

        Ok(info
            .result
            .map(|r| r.points_count.unwrap_or(0) as usize)
            .unwrap_or(0))
    }
}
