//! OpenAI-compatible HTTP embedding provider.
//!
//! Works against any service exposing `POST {base}/embeddings` with the
//! OpenAI request/response shape (OpenAI itself, Ollama, vLLM, LocalAI).

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::EmbeddingProvider;
use crate::{MedkbError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Blocking HTTP embedding client.
pub struct HttpEmbeddingProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    dimension: Option<usize>,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingsDatum>,
}

#[derive(Deserialize)]
struct EmbeddingsDatum {
    index: usize,
    embedding: Vec<f32>,
}

impl HttpEmbeddingProvider {
    /// `base_url` is the API root, e.g. `https://api.openai.com/v1` or
    /// `http://localhost:11434/v1`.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| MedkbError::EmbeddingService {
                reason: format!("http client init failed: {err}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            dimension: None,
        })
    }

    #[must_use]
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }
}

impl EmbeddingProvider for HttpEmbeddingProvider {
    fn model(&self) -> &str {
        &self.model
    }

    fn dimension_hint(&self) -> Option<usize> {
        self.dimension
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embeddings", self.base_url);
        let mut request = self.client.post(&url).json(&EmbeddingsRequest {
            model: &self.model,
            input: texts,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().map_err(|err| MedkbError::EmbeddingService {
            reason: format!("embeddings request failed: {err}"),
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(MedkbError::EmbeddingService {
                reason: format!("embeddings request returned {status}: {body}"),
            });
        }

        let parsed: EmbeddingsResponse =
            response.json().map_err(|err| MedkbError::EmbeddingService {
                reason: format!("embeddings response malformed: {err}"),
            })?;
        if parsed.data.len() != texts.len() {
            return Err(MedkbError::EmbeddingService {
                reason: format!(
                    "embeddings response count mismatch: sent {}, got {}",
                    texts.len(),
                    parsed.data.len()
                ),
            });
        }

        let mut data = parsed.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}
