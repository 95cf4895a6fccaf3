use expense_intent_agent::{
    classifier::IntentClassifier,
    config::{EmbeddingBackend, EmbeddingConfig},
    conversational::{ConversationSession, MODEL_ERROR_MESSAGE},
    corpus::IntentCorpus,
    embedding::{EmbeddingProvider, HttpEmbeddingProvider},
    error::AgentError,
    models::Intent,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> EmbeddingConfig {
    EmbeddingConfig {
        backend: EmbeddingBackend::Http,
        base_url: server.uri(),
        model: "test-embed".to_string(),
        timeout: Duration::from_secs(5),
        dimension: 2,
    }
}

#[tokio::test]
async fn test_embed_batch_decodes_rows_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_partial_json(json!({ "model": "test-embed", "input": ["a", "b"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[1.0, 0.0], [0.0, 1.0]]
        })))
        .mount(&server)
        .await;

    let provider = HttpEmbeddingProvider::new(&config_for(&server)).unwrap();
    let rows = provider
        .embed_batch(&["a".to_string(), "b".to_string()])
        .await
        .unwrap();

    assert_eq!(rows, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
}

#[tokio::test]
async fn test_server_error_is_model_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;

    let provider = HttpEmbeddingProvider::new(&config_for(&server)).unwrap();
    let result = provider.embed("hello").await;

    match result {
        Err(AgentError::ModelUnavailable(detail)) => assert!(detail.contains("model not loaded")),
        other => panic!("expected ModelUnavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_row_count_mismatch_is_model_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "embeddings": [] })))
        .mount(&server)
        .await;

    let provider = HttpEmbeddingProvider::new(&config_for(&server)).unwrap();
    assert!(matches!(
        provider.embed("hello").await,
        Err(AgentError::ModelUnavailable(_))
    ));
}

#[tokio::test]
async fn test_session_over_http_provider() {
    let server = MockServer::start().await;

    // Utterance and the expense example point the same way; greeting is orthogonal.
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_partial_json(json!({ "input": ["spent 40 on books"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[1.0, 0.1]]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_partial_json(json!({ "input": ["I spent 50 on groceries"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[1.0, 0.0]]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_partial_json(json!({ "input": ["hello"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[0.0, 1.0]]
        })))
        .mount(&server)
        .await;

    let corpus = IntentCorpus::new(vec![
        Intent::new("greeting", &["hello"]),
        Intent::new("log_expense", &["I spent 50 on groceries"]),
    ])
    .unwrap();
    let provider = Arc::new(HttpEmbeddingProvider::new(&config_for(&server)).unwrap());
    let classifier = Arc::new(IntentClassifier::new(provider, corpus));
    let mut session = ConversationSession::new(Uuid::new_v4(), classifier);

    assert_eq!(
        session.dispatch("spent 40 on books").await.as_deref(),
        Some("Logged $40 for books.")
    );
    assert_eq!(session.summary().total, 40.0);
}

#[tokio::test]
async fn test_unreachable_provider_surfaces_error_message() {
    let server = MockServer::start().await;
    let config = config_for(&server);
    drop(server);

    let provider = Arc::new(HttpEmbeddingProvider::new(&config).unwrap());
    let classifier = Arc::new(IntentClassifier::new(provider, IntentCorpus::default()));
    let mut session = ConversationSession::new(Uuid::new_v4(), classifier);

    assert_eq!(
        session.dispatch("I spent 50 on groceries").await.as_deref(),
        Some(MODEL_ERROR_MESSAGE)
    );
    assert!(session.ledger().is_empty());
}
