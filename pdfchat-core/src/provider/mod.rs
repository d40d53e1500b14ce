//! External model collaborators.
//!
//! This module defines the traits the pipeline depends on, [`Embedder`]
//! for vectorizing text and [`Generator`] for producing answer completions,
//! and the Gemini HTTP client implementing both.

mod gemini;
mod types;

pub use gemini::GeminiClient;
pub use types::{EmbedError, Embedder, GenerateError, Generator};
