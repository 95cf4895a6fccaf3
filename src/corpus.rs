//! Intent corpus
//!
//! Ordered collection of intents and their example sentences. Iteration order
//! is declaration order, which is also the classifier's tie-break order.

use crate::error::AgentError;
use crate::models::Intent;
use crate::Result;
use std::collections::HashSet;

pub const LOG_EXPENSE: &str = "log_expense";
pub const GET_SUMMARY: &str = "get_summary";
pub const GREETING: &str = "greeting";
pub const UNKNOWN: &str = "unknown";

/// Static example lists — zero allocation until the corpus is built
const LOG_EXPENSE_EXAMPLES: &[&str] = &[
    "I spent 50 on groceries",
    "bought coffee for 5",
    "paid 20 for gas",
    "rent was 1200",
];

const GET_SUMMARY_EXAMPLES: &[&str] = &[
    "how much did I spend",
    "show me my expenses",
    "what are my transactions",
];

const GREETING_EXAMPLES: &[&str] = &["hello", "hi", "hey", "what's up"];

const UNKNOWN_EXAMPLES: &[&str] = &["asdf", "can you help me", "I don't understand"];

#[derive(Debug, Clone)]
pub struct IntentCorpus {
    intents: Vec<Intent>,
}

impl IntentCorpus {
    /// Build a corpus, rejecting duplicate intent names.
    pub fn new(intents: Vec<Intent>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(intents.len());
        for intent in &intents {
            if !seen.insert(intent.name.as_str()) {
                return Err(AgentError::DuplicateIntent(intent.name.clone()));
            }
        }

        Ok(Self { intents })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Intent> {
        self.intents.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Intent> {
        self.intents.iter().find(|i| i.name == name)
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    /// True when at least one intent can be scored.
    pub fn has_examples(&self) -> bool {
        self.intents.iter().any(Intent::is_scorable)
    }
}

impl Default for IntentCorpus {
    fn default() -> Self {
        Self {
            intents: vec![
                Intent::new(LOG_EXPENSE, LOG_EXPENSE_EXAMPLES),
                Intent::new(GET_SUMMARY, GET_SUMMARY_EXAMPLES),
                Intent::new(GREETING, GREETING_EXAMPLES),
                Intent::new(UNKNOWN, UNKNOWN_EXAMPLES),
            ],
        }
    }
}
