//! Expense Intent Agent
//!
//! A small conversational agent that:
//! - Classifies messages into a fixed set of intents by embedding similarity
//! - Extracts amount and category from "log expense" messages
//! - Keeps a per-session, append-only expense ledger
//! - Answers spending summaries from that ledger
//!
//! MESSAGE FLOW:
//! INPUT → CLASSIFY → (EXTRACT → APPEND) | SUMMARIZE | CANNED → REPLY

pub mod api;
pub mod classifier;
pub mod config;
pub mod conversational;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod extractor;
pub mod ledger;
pub mod models;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use classifier::IntentClassifier;
pub use conversational::ConversationSession;
pub use corpus::IntentCorpus;
pub use ledger::Ledger;
