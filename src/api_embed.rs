//! Ollama-backed embedding provider, behind the `api_embed` feature.
//!
//! Talks to a local Ollama server's `POST /api/embeddings` endpoint, one
//! prompt per request. Transient failures (connection errors, 429, 5xx)
//! are retried with exponential backoff; other HTTP errors fail
//! immediately. Every returned vector is length-checked against the
//! configured dimension and unit-normalized before it leaves this module.

use std::time::Duration;

use serde::Deserialize;

use crate::config::{CorpusConfig, DEFAULT_EMBEDDING_MODEL};
use crate::error::{CorpusError, Result};
use crate::types::{EmbeddingProvider, l2_normalize};

/// Server address used when `OLLAMA_BASE_URL` is not set.
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Vector width of the default `nomic-embed-text` model.
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 768;

/// Connection settings for one Ollama endpoint.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    /// Expected vector width; responses of any other width are rejected.
    pub dimension: usize,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        let base_url = std::env::var("OLLAMA_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_OLLAMA_BASE_URL.to_string());
        Self {
            base_url,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimension: DEFAULT_EMBEDDING_DIMENSION,
            timeout: Duration::from_secs(60),
            max_retries: 3,
        }
    }
}

impl OllamaConfig {
    /// Defaults with the model taken from `config`.
    #[must_use]
    pub fn for_corpus(config: &CorpusConfig) -> Self {
        Self {
            model: config.embedding_model.clone(),
            ..Self::default()
        }
    }
}

/// [`EmbeddingProvider`] over a running Ollama server.
pub struct OllamaEmbedder {
    client: reqwest::blocking::Client,
    config: OllamaConfig,
}

impl OllamaEmbedder {
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| CorpusError::ProviderUnavailable {
                reason: err.to_string(),
            })?;
        Ok(Self { client, config })
    }

    /// Probe the server with a one-word prompt. Catches an unreachable
    /// server or a model of the wrong width before ingestion starts.
    pub fn verify(&self) -> Result<()> {
        self.embed_query("ping").map(|_| ())
    }

    fn request_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let url = embeddings_endpoint(&self.config.base_url);
        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": text,
        });

        let mut last_err = None;
        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tracing::debug!(attempt, delay_secs = delay.as_secs(), "retrying embedding");
                std::thread::sleep(delay);
            }

            match self.client.post(&url).json(&body).send() {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let parsed: EmbeddingsResponse =
                            response.json().map_err(|err| {
                                CorpusError::ProviderUnavailable {
                                    reason: format!("malformed response: {err}"),
                                }
                            })?;
                        return Ok(parsed.embedding);
                    }
                    let detail = response.text().unwrap_or_default();
                    // rate limits and server errors are worth retrying
                    if status.as_u16() == 429 || status.is_server_error() {
                        last_err = Some(format!("{status}: {detail}"));
                        continue;
                    }
                    return Err(CorpusError::ProviderUnavailable {
                        reason: format!("{status}: {detail}"),
                    });
                }
                Err(err) => {
                    last_err = Some(err.to_string());
                    continue;
                }
            }
        }

        Err(CorpusError::ProviderUnavailable {
            reason: last_err.unwrap_or_else(|| "retries exhausted".to_string()),
        })
    }
}

impl EmbeddingProvider for OllamaEmbedder {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = self.request_embedding(text)?;
        if vector.len() != self.config.dimension {
            return Err(CorpusError::DimensionMismatch {
                expected: self.config.dimension as u32,
                actual: vector.len() as u32,
            });
        }
        l2_normalize(&mut vector)?;
        Ok(vector)
    }
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

fn embeddings_endpoint(base_url: &str) -> String {
    format!("{}/api/embeddings", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_join_tolerates_trailing_slash() {
        assert_eq!(
            embeddings_endpoint("http://localhost:11434/"),
            "http://localhost:11434/api/embeddings"
        );
        assert_eq!(
            embeddings_endpoint("http://localhost:11434"),
            "http://localhost:11434/api/embeddings"
        );
    }

    #[test]
    fn corpus_config_supplies_the_model() {
        let corpus = CorpusConfig::at("/tmp/store").with_embedding_model("all-minilm");
        let ollama = OllamaConfig::for_corpus(&corpus);
        assert_eq!(ollama.model, "all-minilm");
        assert_eq!(ollama.dimension, DEFAULT_EMBEDDING_DIMENSION);
    }

    #[test]
    fn unreachable_server_reports_provider_unavailable() {
        // reserved TEST-NET-1 address; connection fails fast
        let config = OllamaConfig {
            base_url: "http://192.0.2.1:1".to_string(),
            timeout: Duration::from_millis(50),
            max_retries: 0,
            ..OllamaConfig::default()
        };
        let embedder = OllamaEmbedder::new(config).unwrap();
        let err = embedder.embed_query("hello").unwrap_err();
        assert!(matches!(err, CorpusError::ProviderUnavailable { .. }));
    }
}
