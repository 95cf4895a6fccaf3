//! Expense ledger
//!
//! Append-only, insertion-ordered record of the expenses logged in one
//! session. Entries are never removed or rewritten.

use crate::models::{ExpenseRecord, LedgerSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Ledger {
    pub created_at: DateTime<Utc>,
    records: Vec<ExpenseRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            created_at: Utc::now(),
            records: Vec::new(),
        }
    }

    /// Append a record at the end
    pub fn append(&mut self, record: ExpenseRecord) {
        self.records.push(record);
    }

    /// Total plus one "$<amount> on <category>" line per record, oldest first
    pub fn summary(&self) -> LedgerSummary {
        LedgerSummary {
            total: self.total(),
            line_items: self.records.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn total(&self) -> f64 {
        self.records.iter().map(ExpenseRecord::amount).sum()
    }

    pub fn records(&self) -> impl Iterator<Item = &ExpenseRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
