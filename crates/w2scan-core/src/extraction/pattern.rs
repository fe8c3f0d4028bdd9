//! Regex-based W-2 field extraction.

use async_trait::async_trait;
use tracing::debug;

use super::rules::{first_match, LengthPolicy, FIELD_PATTERNS, WHITESPACE};
use super::{FieldStrategy, Result};
use crate::models::config::ExtractionConfig;
use crate::models::record::W2Record;

/// Extracts W-2 fields with the static rule table.
#[derive(Debug, Clone, Default)]
pub struct PatternStrategy {
    lengths: LengthPolicy,
}

impl PatternStrategy {
    /// Create a pattern strategy with default length thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pattern strategy from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new()
            .with_min_name_length(config.min_name_length)
            .with_min_address_length(config.min_address_length)
    }

    /// Set the minimum accepted name length.
    pub fn with_min_name_length(mut self, len: usize) -> Self {
        self.lengths.name = len;
        self
    }

    /// Set the minimum accepted address length.
    pub fn with_min_address_length(mut self, len: usize) -> Self {
        self.lengths.address = len;
        self
    }

    /// Run every field's rules over whitespace-collapsed `text`.
    pub fn extract_fields(&self, text: &str) -> W2Record {
        let text = normalize_whitespace(text);
        let mut record = W2Record::new();

        for entry in FIELD_PATTERNS.iter() {
            if let Some(value) = first_match(&entry.rules, &text, &self.lengths) {
                record.set(entry.field, value);
            }
        }

        debug!(
            "Pattern extraction filled {} fields from {} chars",
            record.filled_count(),
            text.len()
        );
        record
    }
}

#[async_trait]
impl FieldStrategy for PatternStrategy {
    fn name(&self) -> &'static str {
        "pattern"
    }

    async fn extract(&self, text: &str) -> Result<W2Record> {
        Ok(self.extract_fields(text))
    }
}

/// Collapse every whitespace run, newlines included, to one space.
///
/// PDF text often splits a label and its value across lines.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}
