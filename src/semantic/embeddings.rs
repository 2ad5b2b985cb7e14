//! Embedding client for OpenAI-compatible APIs.
//!
//! - Blocking HTTP, one text per request
//! - Input truncated to the configured character budget
//! - Failures are values: [`generate_embedding`] turns them into a logged skip

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::preprocess::{truncate_input, MAX_INPUT_CHARS};
use crate::config::EmbeddingConfig;

/// Error type for embedding operations
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("Client initialization failed: {0}")]
    InitFailed(String),

    #[error("Embedding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Embeddings API returned {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("No embedding returned")]
    Empty,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

pub trait Embedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Characters kept from the input before it is sent.
    fn max_input_chars(&self) -> usize {
        MAX_INPUT_CHARS
    }
}

/// Embed `text`, logging and swallowing any failure.
///
/// `None` means "store this record without an embedding", never "stop".
pub fn generate_embedding(embedder: &dyn Embedder, text: &str) -> Option<Vec<f32>> {
    let input = truncate_input(text, embedder.max_input_chars());

    match embedder.embed(input) {
        Ok(embedding) => Some(embedding),
        Err(err) => {
            log::error!("Error generating embedding: {err}");
            None
        }
    }
}

pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimensions: usize,
    max_input_chars: usize,
}

impl OpenAiEmbedder {
    pub fn new(
        api_key: &str,
        config: &EmbeddingConfig,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        if api_key.trim().is_empty() {
            return Err(EmbeddingError::InitFailed("missing API key".to_string()));
        }

        let mut headers = reqwest::header::HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| EmbeddingError::InitFailed("invalid API key".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| EmbeddingError::InitFailed(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            dimensions: config.dimensions,
            max_input_chars: config.max_input_chars,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

impl Embedder for OpenAiEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: truncate_input(text, self.max_input_chars),
            dimensions: self.dimensions,
        };

        let resp = self.client.post(&self.endpoint).json(&request).send()?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(EmbeddingError::Api { status, body });
        }

        let parsed: EmbeddingResponse = resp.json()?;
        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|entry| entry.embedding)
            .ok_or(EmbeddingError::Empty)?;

        if embedding.len() != self.dimensions {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
            });
        }

        Ok(embedding)
    }

    fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    dimensions: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}
