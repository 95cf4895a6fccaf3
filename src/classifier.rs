//! Intent Classifier
//!
//! Scores an utterance against every intent's example sentences:
//! - each intent scores as its single most similar example (max, not mean)
//! - the highest-scoring intent wins, the first one in corpus order on ties
//! - empty input or a corpus without examples falls back to "unknown"

use crate::corpus::IntentCorpus;
use crate::embedding::{cosine_similarity, EmbeddingProvider};
use crate::error::AgentError;
use crate::models::{Classification, Embedding};
use crate::Result;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Embedding-similarity intent classifier
pub struct IntentClassifier {
    provider: Arc<dyn EmbeddingProvider>,
    corpus: IntentCorpus,
    /// Example matrices in corpus order, filled on first use when enabled.
    example_cache: Option<OnceCell<Vec<Vec<Embedding>>>>,
}

impl IntentClassifier {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, corpus: IntentCorpus) -> Self {
        Self {
            provider,
            corpus,
            example_cache: Some(OnceCell::new()),
        }
    }

    /// Re-embed the examples on every call instead of caching them.
    pub fn without_cache(mut self) -> Self {
        self.example_cache = None;
        self
    }

    pub fn corpus(&self) -> &IntentCorpus {
        &self.corpus
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Classify an utterance. Only provider failures are errors.
    pub async fn classify(&self, utterance: &str) -> Result<Classification> {
        let utterance = utterance.trim();
        if utterance.is_empty() || !self.corpus.has_examples() {
            return Ok(Classification::fallback());
        }

        let query = self.provider.embed(utterance).await?;

        let mut best: Option<(&str, f32)> = None;

        match &self.example_cache {
            Some(cache) => {
                let matrices = cache
                    .get_or_try_init(|| self.embed_all_examples())
                    .await?;

                for (intent, rows) in self.corpus.iter().zip(matrices) {
                    if !intent.is_scorable() {
                        continue;
                    }
                    let score = best_row_similarity(&query, rows)?;
                    debug!(intent = %intent.name, score, "intent scored");
                    update_best(&mut best, &intent.name, score);
                }
            }
            None => {
                for intent in self.corpus.iter().filter(|i| i.is_scorable()) {
                    let rows = self.embed_examples(&intent.examples).await?;
                    let score = best_row_similarity(&query, &rows)?;
                    debug!(intent = %intent.name, score, "intent scored");
                    update_best(&mut best, &intent.name, score);
                }
            }
        }

        let Some((intent, score)) = best else {
            return Ok(Classification::fallback());
        };

        info!("Classified intent: {} (Similarity: {:.2})", intent, score);

        Ok(Classification {
            intent: intent.to_string(),
            score: Some(score),
        })
    }

    async fn embed_all_examples(&self) -> Result<Vec<Vec<Embedding>>> {
        let mut matrices = Vec::with_capacity(self.corpus.len());
        for intent in self.corpus.iter() {
            if intent.is_scorable() {
                matrices.push(self.embed_examples(&intent.examples).await?);
            } else {
                matrices.push(Vec::new());
            }
        }
        Ok(matrices)
    }

    async fn embed_examples(&self, examples: &[String]) -> Result<Vec<Embedding>> {
        let rows = self.provider.embed_batch(examples).await?;
        if rows.len() != examples.len() {
            return Err(AgentError::ModelUnavailable(format!(
                "expected {} example embeddings, got {}",
                examples.len(),
                rows.len()
            )));
        }
        Ok(rows)
    }
}

/// Highest cosine similarity of `query` against any row.
fn best_row_similarity(query: &[f32], rows: &[Embedding]) -> Result<f32> {
    let mut best = f32::NEG_INFINITY;
    for row in rows {
        let similarity = cosine_similarity(query, row)?;
        if similarity > best {
            best = similarity;
        }
    }
    Ok(best)
}

/// Strict greater-than: earlier intents keep ties.
fn update_best<'a>(best: &mut Option<(&'a str, f32)>, name: &'a str, score: f32) {
    if score.is_nan() {
        return;
    }
    if best.map_or(true, |(_, current)| score > current) {
        *best = Some((name, score));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{GET_SUMMARY, GREETING, LOG_EXPENSE, UNKNOWN};
    use crate::embedding::HashingEmbeddingProvider;
    use crate::models::Intent;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Lookup-table provider; unknown strings map to the zero vector.
    struct StaticProvider {
        vectors: HashMap<String, Embedding>,
        batch_calls: AtomicUsize,
    }

    impl StaticProvider {
        fn new(pairs: &[(&str, [f32; 2])]) -> Self {
            Self {
                vectors: pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_vec()))
                    .collect(),
                batch_calls: AtomicUsize::new(0),
            }
        }

        fn lookup(&self, text: &str) -> Embedding {
            self.vectors.get(text).cloned().unwrap_or_else(|| vec![0.0, 0.0])
        }
    }

    #[async_trait]
    impl EmbeddingProvider for StaticProvider {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn embed(&self, text: &str) -> Result<Embedding> {
            Ok(self.lookup(text))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|t| self.lookup(t)).collect())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl EmbeddingProvider for FailingProvider {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn embed(&self, _text: &str) -> Result<Embedding> {
            Err(AgentError::ModelUnavailable("model not loaded".to_string()))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Embedding>> {
            Err(AgentError::ModelUnavailable("model not loaded".to_string()))
        }
    }

    fn hashing_classifier() -> IntentClassifier {
        let provider = Arc::new(HashingEmbeddingProvider::new(256).unwrap());
        IntentClassifier::new(provider, IntentCorpus::default())
    }

    #[tokio::test]
    async fn test_corpus_examples_classify_to_their_intent() {
        let classifier = hashing_classifier();
        let cases = vec![
            ("I spent 50 on groceries", LOG_EXPENSE),
            ("paid 35 for gas", LOG_EXPENSE),
            ("how much did I spend", GET_SUMMARY),
            ("show me my expenses", GET_SUMMARY),
            ("hello", GREETING),
            ("asdf", UNKNOWN),
        ];

        for (utterance, expected) in cases {
            let result = classifier.classify(utterance).await.unwrap();
            assert_eq!(result.intent, expected, "utterance: {}", utterance);
        }
    }

    #[tokio::test]
    async fn test_classification_is_deterministic() {
        let classifier = hashing_classifier();
        let first = classifier.classify("bought lunch for 12").await.unwrap();
        for _ in 0..5 {
            assert_eq!(classifier.classify("bought lunch for 12").await.unwrap(), first);
        }
    }

    #[tokio::test]
    async fn test_best_single_example_wins_over_average() {
        // "a" has one perfect match and one poor one; "b" has two good ones.
        let provider = Arc::new(StaticProvider::new(&[
            ("query", [1.0, 0.0]),
            ("a1", [1.0, 0.0]),
            ("a2", [-1.0, 0.0]),
            ("b1", [0.9, 0.1]),
            ("b2", [0.9, 0.1]),
        ]));
        let corpus = IntentCorpus::new(vec![
            Intent::new("b", &["b1", "b2"]),
            Intent::new("a", &["a1", "a2"]),
        ])
        .unwrap();

        let classifier = IntentClassifier::new(provider, corpus);
        let result = classifier.classify("query").await.unwrap();
        assert_eq!(result.intent, "a");
        assert!((result.score.unwrap() - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_tie_resolves_to_first_intent() {
        let provider = Arc::new(StaticProvider::new(&[
            ("query", [1.0, 0.0]),
            ("first", [2.0, 0.0]),
            ("second", [3.0, 0.0]),
        ]));
        let corpus = IntentCorpus::new(vec![
            Intent::new("first_intent", &["first"]),
            Intent::new("second_intent", &["second"]),
        ])
        .unwrap();

        let classifier = IntentClassifier::new(provider, corpus);
        let result = classifier.classify("query").await.unwrap();
        assert_eq!(result.intent, "first_intent");
    }

    #[tokio::test]
    async fn test_empty_examples_skipped() {
        let provider = Arc::new(StaticProvider::new(&[
            ("query", [0.0, 1.0]),
            ("weak", [1.0, 1.0]),
        ]));
        let corpus = IntentCorpus::new(vec![
            Intent::new("empty", &[]),
            Intent::new("weak_match", &["weak"]),
        ])
        .unwrap();

        let classifier = IntentClassifier::new(provider, corpus);
        let result = classifier.classify("query").await.unwrap();
        assert_eq!(result.intent, "weak_match");
    }

    #[tokio::test]
    async fn test_negative_best_score_still_selected() {
        let provider = Arc::new(StaticProvider::new(&[
            ("query", [1.0, 0.0]),
            ("opposite", [-1.0, 0.0]),
        ]));
        let corpus = IntentCorpus::new(vec![Intent::new("only", &["opposite"])]).unwrap();

        let classifier = IntentClassifier::new(provider, corpus);
        let result = classifier.classify("query").await.unwrap();
        assert_eq!(result.intent, "only");
        assert!((result.score.unwrap() + 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_fallback_for_blank_input_and_empty_corpus() {
        let classifier = IntentClassifier::new(Arc::new(FailingProvider), IntentCorpus::default());
        assert_eq!(classifier.classify("   ").await.unwrap(), Classification::fallback());

        let empty = IntentCorpus::new(vec![Intent::new("empty", &[])]).unwrap();
        let classifier = IntentClassifier::new(Arc::new(FailingProvider), empty);
        assert_eq!(classifier.classify("hello").await.unwrap(), Classification::fallback());
    }

    #[tokio::test]
    async fn test_provider_failure_is_model_unavailable() {
        let classifier = IntentClassifier::new(Arc::new(FailingProvider), IntentCorpus::default());
        let result = classifier.classify("hello").await;
        assert!(matches!(result, Err(AgentError::ModelUnavailable(_))));
    }

    #[tokio::test]
    async fn test_example_cache() {
        let pairs = [("query", [1.0, 0.0]), ("x", [1.0, 0.0]), ("y", [0.0, 1.0])];
        let corpus = IntentCorpus::new(vec![
            Intent::new("x_intent", &["x"]),
            Intent::new("y_intent", &["y"]),
        ])
        .unwrap();

        let cached = Arc::new(StaticProvider::new(&pairs));
        let classifier = IntentClassifier::new(cached.clone(), corpus.clone());
        classifier.classify("query").await.unwrap();
        classifier.classify("query").await.unwrap();
        assert_eq!(cached.batch_calls.load(Ordering::SeqCst), 2);

        let uncached = Arc::new(StaticProvider::new(&pairs));
        let classifier = IntentClassifier::new(uncached.clone(), corpus).without_cache();
        classifier.classify("query").await.unwrap();
        classifier.classify("query").await.unwrap();
        assert_eq!(uncached.batch_calls.load(Ordering::SeqCst), 4);
    }
}
