//! Embedding provider trait and implementations
//!
//! The embedding model is an external capability. The agent only needs a
//! vector for one string and a matrix (rows in input order) for many.

use crate::config::{EmbeddingBackend, EmbeddingConfig};
use crate::error::AgentError;
use crate::models::Embedding;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub mod hashing;
pub mod http;

pub use hashing::HashingEmbeddingProvider;
pub use http::HttpEmbeddingProvider;

/// Trait for text embedding (external model)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn embed(&self, text: &str) -> Result<Embedding>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Make sure the model is loaded and answering.
    async fn warm_up(&self) -> Result<()> {
        self.embed("hello").await.map(|_| ())
    }
}

/// Cosine similarity between two vectors.
///
/// A zero vector has similarity `0.0` with everything. Vectors of different
/// dimension mean the provider returned inconsistent output.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(AgentError::ModelUnavailable(format!(
            "embedding dimension mismatch: expected {}, got {}",
            a.len(),
            b.len()
        )));
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
}

pub fn create_embedding_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.backend {
        EmbeddingBackend::Http => {
            info!(
                "Embedding backend: http ({} via {})",
                config.model, config.base_url
            );
            Ok(Arc::new(HttpEmbeddingProvider::new(config)?))
        }
        EmbeddingBackend::Hashing => {
            info!("Embedding backend: hashing ({} dims)", config.dimension);
            Ok(Arc::new(HashingEmbeddingProvider::new(config.dimension)?))
        }
    }
}
