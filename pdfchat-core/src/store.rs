//! Vector store abstraction.
//!
//! The store persists chunks with their embeddings in a named collection
//! and answers nearest-neighbor queries. The persisted layout is entirely
//! owned by the backend; this core depends only on the trait.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// A chunk prepared for storage: text, embedding, and string metadata.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    pub metadata: HashMap<String, String>,
}

impl ChunkRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            embedding,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A stored chunk returned from a similarity query.
///
/// Scores are cosine similarities as reported by the backend; higher means
/// more similar.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub id: String,
    pub text: String,
    pub score: f32,
    pub metadata: HashMap<String, String>,
}

/// Unified interface for vector store backends.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Adds chunks to the collection. The collection is append-only from
    /// this core's perspective; completed writes are never rolled back.
    async fn add(&self, records: Vec<ChunkRecord>) -> Result<()>;

    /// Returns up to `top_k` stored chunks ranked by descending similarity.
    ///
    /// Fewer results than `top_k` (including none at all) is a valid
    /// outcome and is never padded.
    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<RetrievedChunk>>;

    /// Total number of chunks in the collection.
    async fn count(&self) -> Result<usize>;
}
