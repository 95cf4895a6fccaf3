//! Expense Extractor
//!
//! Pulls an amount and a category out of a message already classified as
//! an expense. The amount is the first run of digits; the category comes from
//! "on <word>", then "for <word>", else "Uncategorized".

use crate::error::AgentError;
use crate::models::{ExtractedExpense, DEFAULT_CATEGORY};
use crate::Result;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref AMOUNT_PATTERN: Regex = Regex::new(r"[0-9]+").expect("valid regex");
    static ref CATEGORY_PATTERNS: [Regex; 2] = [
        // ASCII word characters only, as in JavaScript's `\w`
        Regex::new(r"\bon\s((?-u:\w)+)").expect("valid regex"),
        Regex::new(r"\bfor\s((?-u:\w)+)").expect("valid regex"),
    ];
}

pub struct ExpenseExtractor;

impl ExpenseExtractor {
    /// Extract amount and category. Fails with `NoAmountFound` when the text
    /// has no digits, or `InvalidAmount` when the digits parse to zero.
    pub fn extract(text: &str) -> Result<ExtractedExpense> {
        let category = Self::category(text);
        let amount = Self::amount(text)?;

        Ok(ExtractedExpense { amount, category })
    }

    /// First contiguous digit run, parsed as a float.
    pub fn amount(text: &str) -> Result<f64> {
        let digits = AMOUNT_PATTERN
            .find(text)
            .ok_or(AgentError::NoAmountFound)?
            .as_str();

        let amount: f64 = digits
            .parse()
            .map_err(|_| AgentError::InvalidAmount(digits.to_string()))?;

        if amount <= 0.0 || !amount.is_finite() {
            return Err(AgentError::InvalidAmount(digits.to_string()));
        }

        Ok(amount)
    }

    /// Category word; the "on" pattern is always tried before "for".
    pub fn category(text: &str) -> String {
        CATEGORY_PATTERNS
            .iter()
            .find_map(|pattern| pattern.captures(text))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
    }
}
