//! Core data models for the expense agent

use crate::error::AgentError;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category used when the message names none.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Embedding vector, dimension chosen by the provider.
pub type Embedding = Vec<f32>;

//
// ================= Intent =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Intent {
    pub name: String,
    pub examples: Vec<String>,
}

impl Intent {
    pub fn new(name: impl Into<String>, examples: &[&str]) -> Self {
        Self {
            name: name.into(),
            examples: examples.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Intents without examples never take part in scoring.
    pub fn is_scorable(&self) -> bool {
        !self.examples.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    pub intent: String,
    /// Best cosine similarity, `None` for the fallback result.
    pub score: Option<f32>,
}

impl Classification {
    pub fn fallback() -> Self {
        Self {
            intent: crate::corpus::UNKNOWN.to_string(),
            score: None,
        }
    }
}

//
// ================= Expense =================
//

/// A single ledger entry. Fields are private so a record cannot change
/// after it has been created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseRecord {
    amount: f64,
    category: String,
    timestamp: DateTime<Utc>,
}

impl ExpenseRecord {
    /// Create a record stamped with the current time.
    pub fn new(amount: f64, category: impl Into<String>) -> Result<Self> {
        Self::at(amount, category, Utc::now())
    }

    pub fn at(amount: f64, category: impl Into<String>, timestamp: DateTime<Utc>) -> Result<Self> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(AgentError::InvalidAmount(format!(
                "amount must be positive, got {}",
                amount
            )));
        }

        let category = category.into();
        let category = if category.trim().is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            category
        };

        Ok(Self {
            amount,
            category,
            timestamp,
        })
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl fmt::Display for ExpenseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${} on {}", Amount(self.amount), self.category)
    }
}

/// Output of the expense extractor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedExpense {
    pub amount: f64,
    pub category: String,
}

//
// ================= Summary =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerSummary {
    pub total: f64,
    pub line_items: Vec<String>,
}

impl LedgerSummary {
    /// Joined line items, or `"none"` for an empty ledger.
    pub fn rendered_items(&self) -> String {
        if self.line_items.is_empty() {
            "none".to_string()
        } else {
            self.line_items.join(", ")
        }
    }
}

/// Money amount as shown to the user: whole numbers without a fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Amount(pub f64);

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 && self.0.abs() < 1e15 {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}
