//! pdfchat-core - retrieval-augmented question answering over PDF documents
//!
//! Provides the building blocks of the pdfchat pipeline:
//! - Token-budget text chunking
//! - PDF text extraction
//! - Embedding and answer generation via the Gemini API
//! - Vector storage (Qdrant)
//! - Retrieval, prompt composition, and pipeline orchestration
//!
//! ## Overview
//!
//! Ingestion chunks a document and stores each chunk with its embedding in
//! a named collection. A query embeds the question, retrieves the most
//! similar chunks, composes them into a grounding prompt, and asks the
//! generative model for a concise answer drawn only from that context.

// Public modules
pub mod chunker;
pub mod config;
pub mod extract;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod qdrant_store;
pub mod retriever;
pub mod store;

// Public exports
pub use chunker::{chunk_text, Chunk, ChunkError, ChunkOutcome};
pub use config::{ApiKey, Config, ConfigError, API_KEY_ENV};
pub use extract::{extract_pdf_text, ExtractError};
pub use pipeline::{Answer, Pipeline, PipelineError};
pub use provider::{EmbedError, Embedder, GeminiClient, GenerateError, Generator};
pub use qdrant_store::QdrantStore;
pub use retriever::{RetrieveError, Retriever};
pub use store::{ChunkRecord, RetrievedChunk, VectorStore};
