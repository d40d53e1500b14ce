//! Query-time retrieval of relevant chunks.

use crate::provider::{EmbedError, Embedder};
use crate::store::VectorStore;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during retrieval.
#[derive(Debug, Error)]
pub enum RetrieveError {
    /// The query string was empty after trimming.
    #[error("query must not be empty")]
    EmptyQuery,

    /// The embedding service failed for the query text.
    #[error("query embedding failed: {0}")]
    Embed(#[from] EmbedError),

    /// The vector store failed to answer the similarity query.
    #[error("vector store query failed: {0}")]
    Store(String),
}

/// Result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrieveError>;

/// Retrieves the most relevant stored chunk texts for a query.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>, top_k: usize) -> Self {
        Self {
            embedder,
            store,
            top_k,
        }
    }

    /// Returns up to `top_k` chunk texts ranked by descending similarity,
    /// as reported by the store.
    ///
    /// An empty result is a valid outcome (an empty collection, for
    /// instance); it is never padded and never an error.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<String>> {
        if query.trim().is_empty() {
            return Err(RetrieveError::EmptyQuery);
        }

        let embedding = self.embedder.embed(query).await?;
        debug!(dimension = embedding.len(), "Query embedding generated");

        let hits = self
            .store
            .query(&embedding, self.top_k)
            .await
            .map_err(|e| RetrieveError::Store(e.to_string()))?;
        debug!(count = hits.len(), "Vector store returned matches");

        Ok(hits.into_iter().map(|hit| hit.text).collect())
    }
}
