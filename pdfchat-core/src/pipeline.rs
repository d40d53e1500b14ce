//! Ingestion and query orchestration.
//!
//! Ingestion is one-shot: document text is chunked, embedded in batches,
//! and stored. A query walks Embedding → Retrieving → Composing →
//! Generating in strict sequence; any stage failure surfaces as the
//! [`PipelineError`] variant named for that stage, and an empty retrieval
//! short-circuits to [`Answer::NoRelevantContext`] before the generative
//! service is ever invoked. The pipeline performs no retries itself;
//! retry policy belongs to the callers of the external adapters.

use crate::chunker::{self, ChunkError, ChunkOutcome};
use crate::config::Config;
use crate::prompt;
use crate::provider::{EmbedError, Embedder, GenerateError, Generator};
use crate::retriever::{RetrieveError, Retriever};
use crate::store::{ChunkRecord, VectorStore};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Chunks are embedded in batches of this many texts per provider call.
const EMBED_BATCH_SIZE: usize = 32;

/// Errors from a pipeline run, annotated with the stage that produced them.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("chunking stage failed: {0}")]
    Chunking(#[from] ChunkError),

    #[error("embedding stage failed: {0}")]
    Embedding(#[from] EmbedError),

    #[error("storage stage failed: {0}")]
    Storage(String),

    #[error("retrieval stage failed: {0}")]
    Retrieval(#[from] RetrieveError),

    #[error("generation stage failed: {0}")]
    Generation(#[from] GenerateError),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Outcome of a query run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// A grounded completion from the generative service.
    Text(String),
    /// Retrieval found nothing; no answer is possible and the generative
    /// service was not invoked.
    NoRelevantContext,
}

/// Orchestrates chunk storage and retrieval-augmented answering.
///
/// Each ingestion run and each query run is independent; the only shared
/// state is the external collection, which is append-only once a write
/// completes. Collaborators are shared via `Arc` and safe to use from
/// concurrent runs.
pub struct Pipeline {
    max_tokens: usize,
    min_chunk_size: usize,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    generator: Arc<dyn Generator>,
    retriever: Retriever,
}

impl Pipeline {
    pub fn new(
        config: &Config,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        let retriever = Retriever::new(
            Arc::clone(&embedder),
            Arc::clone(&store),
            config.storage.top_k,
        );

        Self {
            max_tokens: config.chunking.max_tokens,
            min_chunk_size: config.chunking.min_chunk_size,
            embedder,
            store,
            generator,
            retriever,
        }
    }

    /// Chunks `text` and stores every chunk with its embedding.
    ///
    /// Returns the number of chunks stored. Text that yields no usable
    /// chunks stores nothing and returns zero. Re-ingesting the same text
    /// appends new records under fresh ids; deduplication is the caller's
    /// concern, not this core's.
    pub async fn ingest(&self, text: &str) -> Result<usize> {
        let outcome = chunker::chunk_text(text, self.max_tokens, self.min_chunk_size)?;
        let chunks = match outcome {
            ChunkOutcome::NoUsableContent => {
                info!("No usable chunks in document, nothing stored");
                return Ok(0);
            }
            ChunkOutcome::Chunks(chunks) => chunks,
        };
        info!(count = chunks.len(), "Document chunked");

        let mut stored = 0;
        for batch in chunks.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|chunk| chunk.text.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;

            let records: Vec<ChunkRecord> = batch
                .iter()
                .zip(embeddings)
                .enumerate()
                .map(|(i, (chunk, embedding))| {
                    ChunkRecord::new(chunk.id.to_string(), chunk.text.clone(), embedding)
                        .with_metadata("chunk_index", (stored + i).to_string())
                        .with_metadata("token_estimate", format!("{:.2}", chunk.token_estimate))
                })
                .collect();

            self.store
                .add(records)
                .await
                .map_err(|e| PipelineError::Storage(e.to_string()))?;

            stored += batch.len();
            debug!(stored, "Chunk batch stored");
        }

        Ok(stored)
    }

    /// Answers `question` from the stored collection.
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        debug!("Entering retrieval stage");
        let context = self.retriever.retrieve(question).await?;

        if context.is_empty() {
            info!("Retrieval returned no chunks, skipping generation");
            return Ok(Answer::NoRelevantContext);
        }
        info!(count = context.len(), "Retrieved context chunks");

        debug!("Entering composition stage");
        let prompt = prompt::compose(question, &context);

        debug!("Entering generation stage");
        let answer = self.generator.generate(&prompt).await?;

        Ok(Answer::Text(answer))
    }
}
