//! Gemini provider implementation.
//!
//! HTTP client for the Generative Language API implementing both the
//! [`Embedder`] and [`Generator`] traits.

use super::types::*;
use crate::config::{ApiKey, LlmConfig};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Gemini HTTP API provider.
///
/// One client serves both concerns: `embedContent`/`batchEmbedContents` for
/// vectors and `generateContent` for completions. The configured request
/// timeout applies to every call; a timeout surfaces as a transient
/// (retryable) failure.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    base_url: String,
    model: String,
    embedding_model: String,
    api_key: ApiKey,
    http_client: reqwest::Client,
}

impl GeminiClient {
    /// Creates a client from config and the startup-resolved credential.
    pub fn new(config: &LlmConfig, api_key: ApiKey) -> reqwest::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            embedding_model: config.embedding_model.clone(),
            api_key,
            http_client,
        })
    }

    fn url(&self, model: &str, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, model, method)
    }
}

/// Maps a non-success generation status to the matching error kind.
fn classify_generation_status(status: StatusCode, body: String) -> GenerateError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerateError::Auth(body),
        StatusCode::TOO_MANY_REQUESTS => GenerateError::Quota(body),
        s if s.is_server_error() => GenerateError::Transient(body),
        _ => GenerateError::Api(body),
    }
}

/// Maps a non-success embedding status to the matching error kind.
fn classify_embedding_status(status: StatusCode, body: String) -> EmbedError {
    if status.is_server_error() {
        EmbedError::Transient(body)
    } else {
        EmbedError::Api(body)
    }
}

#[async_trait]
impl Embedder for GeminiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let request = EmbedContentRequest {
            content: Content::from_text(text),
        };

        let response = self
            .http_client
            .post(self.url(&self.embedding_model, "embedContent"))
            .header("x-goog-api-key", self.api_key.expose())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(classify_embedding_status(status, body));
        }

        let embed_response = response.json::<EmbedContentResponse>().await?;
        let values = embed_response.embedding.values;
        if values.is_empty() {
            return Err(EmbedError::NoEmbeddings);
        }
        Ok(values)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model_path = format!("models/{}", self.embedding_model);
        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| BatchEmbedEntry {
                    model: model_path.clone(),
                    content: Content::from_text(text),
                })
                .collect(),
        };

        debug!(count = texts.len(), "Requesting embedding batch");
        let response = self
            .http_client
            .post(self.url(&self.embedding_model, "batchEmbedContents"))
            .header("x-goog-api-key", self.api_key.expose())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(classify_embedding_status(status, body));
        }

        let batch = response.json::<BatchEmbedResponse>().await?;
        if batch.embeddings.len() != texts.len() {
            return Err(EmbedError::Api(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                batch.embeddings.len()
            )));
        }
        Ok(batch.embeddings.into_iter().map(|e| e.values).collect())
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let request = GenerateContentRequest {
            contents: vec![Content::from_text(prompt)],
        };

        let response = self
            .http_client
            .post(self.url(&self.model, "generateContent"))
            .header("x-goog-api-key", self.api_key.expose())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(classify_generation_status(status, body));
        }

        let completion = response.json::<GenerateContentResponse>().await?;
        let text = completion
            .candidates
            .into_iter()
            .flat_map(|candidate| candidate.content.parts)
            .map(|part| part.text)
            .collect::<String>();

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(GenerateError::EmptyCompletion);
        }
        Ok(text)
    }
}

// Gemini-specific request/response types (internal)

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

impl Content {
    fn from_text(text: &str) -> Self {
        Self {
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest {
    content: Content,
}

#[derive(Debug, Default, Deserialize)]
struct EmbedContentResponse {
    #[serde(default)]
    embedding: EmbeddingValues,
}

#[derive(Debug, Default, Deserialize)]
struct EmbeddingValues {
    #[serde(default)]
    values: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct BatchEmbedRequest {
    requests: Vec<BatchEmbedEntry>,
}

#[derive(Debug, Serialize)]
struct BatchEmbedEntry {
    model: String,
    content: Content,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_statuses_map_to_auth_errors() {
        assert!(matches!(
            classify_generation_status(StatusCode::UNAUTHORIZED, String::new()),
            GenerateError::Auth(_)
        ));
        assert!(matches!(
            classify_generation_status(StatusCode::FORBIDDEN, String::new()),
            GenerateError::Auth(_)
        ));
    }

    #[test]
    fn throttling_maps_to_quota() {
        assert!(matches!(
            classify_generation_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            GenerateError::Quota(_)
        ));
    }

    #[test]
    fn server_errors_are_transient() {
        assert!(matches!(
            classify_generation_status(StatusCode::INTERNAL_SERVER_ERROR, String::new()),
            GenerateError::Transient(_)
        ));
        assert!(matches!(
            classify_generation_status(StatusCode::SERVICE_UNAVAILABLE, String::new()),
            GenerateError::Transient(_)
        ));
        assert!(matches!(
            classify_embedding_status(StatusCode::BAD_GATEWAY, String::new()),
            EmbedError::Transient(_)
        ));
    }

    #[test]
    fn other_statuses_are_api_errors() {
        assert!(matches!(
            classify_generation_status(StatusCode::BAD_REQUEST, String::new()),
            GenerateError::Api(_)
        ));
        assert!(matches!(
            classify_embedding_status(StatusCode::NOT_FOUND, String::new()),
            EmbedError::Api(_)
        ));
    }
}
