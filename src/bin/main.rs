use expense_intent_agent::{
    classifier::IntentClassifier,
    config::AgentConfig,
    conversational::ConversationSession,
    corpus::IntentCorpus,
    embedding::create_embedding_provider,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout only carries the conversation
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenv::dotenv().ok();
    let config = AgentConfig::from_env()?;

    info!("Expense agent starting");

    let provider = create_embedding_provider(&config.embedding)?;
    let mut classifier = IntentClassifier::new(provider, IntentCorpus::default());
    if !config.cache_examples {
        classifier = classifier.without_cache();
    }

    let (mut session, banner) =
        ConversationSession::open(Uuid::new_v4(), Arc::new(classifier)).await;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(format!("bot> {}\n", banner).as_bytes()).await?;
    stdout.flush().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if matches!(line.trim(), "exit" | "quit") {
            break;
        }

        if let Some(reply) = session.dispatch(&line).await {
            stdout.write_all(format!("bot> {}\n", reply).as_bytes()).await?;
            stdout.flush().await?;
        }
    }

    let summary = session.summary();
    info!(
        session_id = %session.session_id(),
        expenses = summary.line_items.len(),
        total = summary.total,
        "Session closed"
    );

    Ok(())
}
