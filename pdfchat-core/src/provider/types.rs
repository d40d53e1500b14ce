//! Common types for model providers.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the embedding service.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// The HTTP request itself failed.
    #[error("request failed: {0}")]
    Request(reqwest::Error),

    /// A retryable upstream failure (5xx or a request timeout).
    #[error("transient embedding failure: {0}")]
    Transient(String),

    /// The API rejected the request.
    #[error("embedding API error: {0}")]
    Api(String),

    /// The response contained no embedding values.
    #[error("no embeddings returned")]
    NoEmbeddings,
}

impl From<reqwest::Error> for EmbedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EmbedError::Transient(err.to_string())
        } else {
            EmbedError::Request(err)
        }
    }
}

/// Errors from the generative answer service.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The HTTP request itself failed.
    #[error("request failed: {0}")]
    Request(reqwest::Error),

    /// The credential was rejected.
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// The request was throttled or the quota is exhausted.
    #[error("quota exhausted: {0}")]
    Quota(String),

    /// A retryable upstream failure (5xx or a request timeout).
    #[error("transient upstream failure: {0}")]
    Transient(String),

    /// The API rejected the request.
    #[error("generation API error: {0}")]
    Api(String),

    /// The model produced no completion text.
    #[error("model returned no completion")]
    EmptyCompletion,
}

impl From<reqwest::Error> for GenerateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerateError::Transient(err.to_string())
        } else {
            GenerateError::Request(err)
        }
    }
}

/// Produces fixed-length embedding vectors for text.
///
/// Implementations are opaque to the pipeline: a vector comes back or a
/// tagged failure does.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding vector for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Generate embedding vectors for a batch of texts, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;
}

/// Produces a text completion for a prompt.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}
