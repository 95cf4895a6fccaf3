//! Conversation dispatcher
//!
//! One session owns one ledger. Each message is classified, routed to the
//! matching handler, and answered with a single display string. Logging an
//! expense is the only path that changes state.

use crate::classifier::IntentClassifier;
use crate::corpus::{GET_SUMMARY, GREETING, LOG_EXPENSE};
use crate::extractor::ExpenseExtractor;
use crate::ledger::Ledger;
use crate::models::{Amount, Classification, ExpenseRecord, LedgerSummary};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub const READY_MESSAGE: &str = "Bot is ready! What did you spend?";
pub const LOAD_ERROR_MESSAGE: &str = "Error loading bot. Please refresh the page.";
pub const CLARIFY_MESSAGE: &str =
    "Please tell me the amount and what you spent it on, e.g., \"I spent 50 on groceries\".";
pub const GREETING_MESSAGE: &str = "Hi there! How can I help you manage your expenses today?";
pub const FALLBACK_MESSAGE: &str =
    "I am not sure how to help with that. Please ask about logging expenses or getting a summary.";
pub const MODEL_ERROR_MESSAGE: &str =
    "Sorry, I couldn't reach the language model. Please try again.";

/// Response for one dispatched message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationalResponse {
    pub reply: String,
    pub intent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logged: Option<ExpenseRecord>,
}

/// A single conversation and its ledger.
///
/// `&mut self` on every message keeps processing strictly sequential; callers
/// that share a session across tasks must wrap it in a lock.
pub struct ConversationSession {
    session_id: Uuid,
    classifier: Arc<IntentClassifier>,
    ledger: Ledger,
}

impl ConversationSession {
    pub fn new(session_id: Uuid, classifier: Arc<IntentClassifier>) -> Self {
        Self {
            session_id,
            classifier,
            ledger: Ledger::new(),
        }
    }

    /// Start a session and warm the embedding model up.
    ///
    /// Returns the banner to show the user. A failed warm-up still yields a
    /// usable session; later messages retry the provider naturally.
    pub async fn open(session_id: Uuid, classifier: Arc<IntentClassifier>) -> (Self, String) {
        let session = Self::new(session_id, classifier);

        info!(session_id = %session_id, "Bot is loading...");
        let banner = match session.classifier.provider().warm_up().await {
            Ok(()) => {
                info!(session_id = %session_id, "Embedding model ready");
                READY_MESSAGE.to_string()
            }
            Err(e) => {
                warn!(session_id = %session_id, "Failed to load model: {}", e);
                LOAD_ERROR_MESSAGE.to_string()
            }
        };

        (session, banner)
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn summary(&self) -> LedgerSummary {
        self.ledger.summary()
    }

    /// Handle one message and return the text to display.
    ///
    /// Blank input produces no response. Provider failures become a
    /// user-visible error message.
    pub async fn dispatch(&mut self, utterance: &str) -> Option<String> {
        match self.respond(utterance).await {
            Ok(response) => response.map(|r| r.reply),
            Err(e) => {
                warn!(session_id = %self.session_id, "Message handling failed: {}", e);
                Some(MODEL_ERROR_MESSAGE.to_string())
            }
        }
    }

    /// Handle one message, keeping classification details and errors.
    pub async fn respond(&mut self, utterance: &str) -> crate::Result<Option<ConversationalResponse>> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Ok(None);
        }

        let classification = self.classifier.classify(utterance).await?;
        let Classification { intent, score } = classification;

        let (reply, logged) = match intent.as_str() {
            LOG_EXPENSE => self.log_expense(utterance)?,
            GET_SUMMARY => (self.summary_reply(), None),
            GREETING => (GREETING_MESSAGE.to_string(), None),
            _ => (FALLBACK_MESSAGE.to_string(), None),
        };

        Ok(Some(ConversationalResponse {
            reply,
            intent,
            similarity: score,
            logged,
        }))
    }

    fn log_expense(&mut self, utterance: &str) -> crate::Result<(String, Option<ExpenseRecord>)> {
        let extracted = match ExpenseExtractor::extract(utterance) {
            Ok(extracted) => extracted,
            Err(e) if e.is_recoverable() => {
                info!(session_id = %self.session_id, "Asking for clarification: {}", e);
                return Ok((CLARIFY_MESSAGE.to_string(), None));
            }
            Err(e) => return Err(e),
        };

        let record = ExpenseRecord::new(extracted.amount, extracted.category)?;
        let reply = format!(
            "Logged ${} for {}.",
            Amount(record.amount()),
            record.category()
        );

        info!(
            session_id = %self.session_id,
            amount = record.amount(),
            category = %record.category(),
            "Expense logged"
        );

        self.ledger.append(record.clone());
        Ok((reply, Some(record)))
    }

    fn summary_reply(&self) -> String {
        let summary = self.ledger.summary();
        format!(
            "Your total spending is ${}. Your recent expenses are: {}.",
            Amount(summary.total),
            summary.rendered_items()
        )
    }
}
