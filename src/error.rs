//! Error types for the expense agent

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum AgentError {

    // =============================
    // Conversation Errors
    // =============================

    /// The embedding provider failed to load or respond.
    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("No amount found in message")]
    NoAmountFound,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Duplicate intent: {0}")]
    DuplicateIntent(String),

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AgentError {
    /// Errors the dispatcher answers with a clarification prompt.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AgentError::NoAmountFound | AgentError::InvalidAmount(_))
    }
}
