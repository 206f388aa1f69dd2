//! Embedding client abstraction and the OpenAI adapter.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

/// Errors raised by the embedding service.
#[derive(Debug, Error)]
pub enum EmbeddingServiceError {
    /// HTTP layer failed before a response was received.
    #[error("Embedding request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Service responded with a non-success status (bad credential, rate
    /// limit, and similar).
    #[error("Embedding service returned {status}: {body}")]
    Api {
        /// HTTP status from the embedding endpoint.
        status: StatusCode,
        /// Response body associated with the failure.
        body: String,
    },
    /// Response parsed but did not match the request shape.
    #[error("Embedding response was malformed: {0}")]
    MalformedResponse(String),
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce an embedding vector for each supplied text, in input order.
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingServiceError>;
}

/// Embedding client for the OpenAI `/v1/embeddings` endpoint.
///
/// The credential is supplied at construction and never written to process
/// state; each session can carry its own key.
pub struct OpenAiEmbeddingClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbeddingClient {
    /// Build a client from the session configuration.
    pub fn new(config: &Config) -> Result<Self, EmbeddingServiceError> {
        let client = Client::builder().user_agent("reportqa/0.1").build()?;
        Ok(Self {
            client,
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key.clone(),
            model: config.embedding_model.clone(),
        })
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbeddingClient {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingServiceError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(model = %self.model, inputs = texts.len(), "Requesting embeddings");
        let response = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: &texts,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingServiceError::Api { status, body });
        }

        let payload: EmbeddingResponse = response.json().await?;
        if payload.data.len() != texts.len() {
            return Err(EmbeddingServiceError::MalformedResponse(format!(
                "expected {} vectors, got {}",
                texts.len(),
                payload.data.len()
            )));
        }

        let mut data = payload.data;
        data.sort_by_key(|datum| datum.index);
        Ok(data.into_iter().map(|datum| datum.embedding).collect())
    }
}
