//! HTTP embedding client
//!
//! Talks to an Ollama-compatible `POST /api/embed` endpoint.
//! Uses a long-lived reqwest::Client for connection pooling.

use super::EmbeddingProvider;
use crate::config::EmbeddingConfig;
use crate::error::AgentError;
use crate::models::Embedding;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// Reusable embedding client (connection-pooled)
pub struct HttpEmbeddingProvider {
    client: Client,
    model: String,
    endpoint: String,
}

impl HttpEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(config.timeout)
            .build()
            .map_err(|e| AgentError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            model: config.model.clone(),
            endpoint: format!("{}/api/embed", config.base_url.trim_end_matches('/')),
        })
    }

    async fn request(&self, input: &[&str]) -> Result<Vec<Embedding>> {
        let request = EmbedRequest {
            model: &self.model,
            input,
        };

        debug!("Requesting {} embedding(s) from {}", input.len(), self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Embedding request failed: {}", e);
                AgentError::ModelUnavailable(format!("embedding request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Embedding service error response ({}): {}", status, error_text);
            return Err(AgentError::ModelUnavailable(format!(
                "embedding service returned {}: {}",
                status, error_text
            )));
        }

        let body: EmbedResponse = response.json().await.map_err(|e| {
            error!("Failed to parse embedding response: {}", e);
            AgentError::ModelUnavailable(format!("embedding parse error: {}", e))
        })?;

        if body.embeddings.len() != input.len() {
            return Err(AgentError::ModelUnavailable(format!(
                "expected {} embeddings, got {}",
                input.len(),
                body.embeddings.len()
            )));
        }

        Ok(body.embeddings)
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        self.request(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::ModelUnavailable("empty embedding response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let input: Vec<&str> = texts.iter().map(String::as_str).collect();
        self.request(&input).await
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Embedding>,
}
