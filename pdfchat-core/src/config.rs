use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Environment variable holding the Gemini API credential.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("{0} environment variable not set")]
    MissingApiKey(&'static str),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration for the whole pipeline: model endpoints, chunking
/// parameters, and vector storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Gemini model endpoints and request behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub embedding_model: String,
    /// Dimension of the embedding vectors; must match the embedding model.
    pub embedding_dim: u64,
    pub base_url: String,
    /// Per-request timeout. A timeout surfaces as a transient failure.
    pub request_timeout_secs: u64,
}

/// Chunking parameters. See [`crate::chunker::chunk_text`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Token budget per chunk.
    pub max_tokens: usize,
    /// Minimum chunk length in characters; smaller candidates are dropped.
    pub min_chunk_size: usize,
}

/// Vector store connection and retrieval width.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Qdrant gRPC url.
    pub url: String,
    /// Collection the chunks are stored in.
    pub collection_name: String,
    /// Number of chunks retrieved per query.
    pub top_k: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            embedding_model: "text-embedding-004".to_string(),
            embedding_dim: 768,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            min_chunk_size: 50,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            collection_name: "pdf_chunks".to_string(),
            top_k: 3,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            chunking: ChunkingConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Load configuration from `config.yaml` if it exists, otherwise use
    /// defaults.
    pub fn load_or_default() -> Self {
        Self::load("config.yaml").unwrap_or_default()
    }
}

/// The API credential, resolved once at startup and threaded into the
/// provider constructor. Core logic never reads the environment itself.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Reads the credential from the environment. Absence or a blank value
    /// is a fatal configuration error, raised before any pipeline step.
    pub fn from_env(var: &'static str) -> Result<Self> {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => Ok(Self(value)),
            _ => Err(ConfigError::MissingApiKey(var)),
        }
    }

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

// Redacted so the credential never lands in logs or error chains.
impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunking_defaults() {
        let config = ChunkingConfig::default();
        assert_eq!(config.max_tokens, 512);
        assert_eq!(config.min_chunk_size, 50);
    }

    #[test]
    fn storage_defaults() {
        let config = StorageConfig::default();
        assert_eq!(config.collection_name, "pdf_chunks");
        assert_eq!(config.top_k, 3);
    }

    #[test]
    fn llm_defaults() {
        let config = LlmConfig::default();
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.embedding_model, "text-embedding-004");
        assert_eq!(config.embedding_dim, 768);
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        std::env::remove_var("PDFCHAT_TEST_ABSENT_KEY");
        let err = ApiKey::from_env("PDFCHAT_TEST_ABSENT_KEY").unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey(_)));
    }

    #[test]
    fn blank_api_key_is_a_config_error() {
        std::env::set_var("PDFCHAT_TEST_BLANK_KEY", "   ");
        let err = ApiKey::from_env("PDFCHAT_TEST_BLANK_KEY").unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey(_)));
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("super-secret");
        assert_eq!(format!("{key:?}"), "ApiKey(..)");
    }
}
