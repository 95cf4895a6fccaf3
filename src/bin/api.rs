use expense_intent_agent::{
    api::{start_server, ApiState},
    classifier::IntentClassifier,
    config::AgentConfig,
    corpus::IntentCorpus,
    embedding::create_embedding_provider,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load environment variables
    dotenv::dotenv().ok();
    let config = AgentConfig::from_env()?;

    info!("🚀 Expense Agent - API Server");
    info!("📍 Port: {}", config.port);

    let provider = create_embedding_provider(&config.embedding)?;
    let mut classifier = IntentClassifier::new(provider, IntentCorpus::default());
    if !config.cache_examples {
        classifier = classifier.without_cache();
    }

    info!("✅ Classifier initialized");
    info!("📡 Starting API server...");

    info!(
        "🗂️  Session limits: {} max, {}s idle",
        config.sessions.max_sessions,
        config.sessions.idle_timeout.as_secs()
    );

    let state = ApiState::new(Arc::new(classifier), config.sessions);
    start_server(state, config.port).await?;

    Ok(())
}
