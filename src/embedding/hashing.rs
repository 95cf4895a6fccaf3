//! Offline feature-hashing embedder
//!
//! Bag-of-words vectors: each lowercased token is hashed into one of
//! `dimension` buckets with a SHA-256 derived sign, then the vector is
//! L2-normalized. Numbers share one token so "spent 50" and "spent 75" look
//! alike. Deterministic for identical input.

use super::EmbeddingProvider;
use crate::error::AgentError;
use crate::models::Embedding;
use crate::Result;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

const NUMBER_TOKEN: &str = "<num>";

#[derive(Debug, Clone)]
pub struct HashingEmbeddingProvider {
    dimension: usize,
}

impl HashingEmbeddingProvider {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(AgentError::ConfigError(
                "hashing embedder dimension must be greater than zero".to_string(),
            ));
        }
        Ok(Self { dimension })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Embedding {
        let mut out = vec![0.0f32; self.dimension];

        for token in tokenize(text) {
            let digest = Sha256::digest(token.as_bytes());
            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimension as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            out[bucket] += sign;
        }

        let norm = out.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in out.iter_mut() {
                *x /= norm;
            }
        }

        out
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .map(|t| {
            if t.chars().all(|c| c.is_ascii_digit()) {
                NUMBER_TOKEN.to_string()
            } else {
                t.to_lowercase()
            }
        })
}

#[async_trait]
impl EmbeddingProvider for HashingEmbeddingProvider {
    fn name(&self) -> &'static str {
        "hashing"
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        Ok(self.encode(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|t| self.encode(t)).collect())
    }

    async fn warm_up(&self) -> Result<()> {
        Ok(())
    }
}
