//! Data-driven regex rules for W-2 fields.
//!
//! Each field owns an ordered list of rules. The first rule whose capture
//! passes the minimum-length check for its kind wins.

pub mod patterns;

pub use patterns::{FIELD_PATTERNS, WHITESPACE};

use regex::Regex;

use crate::models::record::FieldName;

/// What a rule captures, which decides its minimum accepted length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    /// Person or company name.
    Name,
    /// Street address or city/state/ZIP line.
    Address,
    /// SSN or EIN, already shape-constrained by the regex.
    Identifier,
    /// Dollar amount.
    Amount,
    /// Free alphanumeric code (control number).
    Code,
}

/// A single regex with the kind of value its first group captures.
#[derive(Debug)]
pub struct FieldRule {
    pub pattern: Regex,
    pub kind: CaptureKind,
}

impl FieldRule {
    pub fn new(pattern: Regex, kind: CaptureKind) -> Self {
        Self { pattern, kind }
    }
}

/// Ordered rules for one field.
#[derive(Debug)]
pub struct FieldPatterns {
    pub field: FieldName,
    pub rules: Vec<FieldRule>,
}

/// Minimum trimmed capture length per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthPolicy {
    pub name: usize,
    pub address: usize,
    pub code: usize,
}

impl LengthPolicy {
    pub fn min_len(&self, kind: CaptureKind) -> usize {
        match kind {
            CaptureKind::Name => self.name,
            CaptureKind::Address => self.address,
            CaptureKind::Code => self.code,
            CaptureKind::Identifier | CaptureKind::Amount => 1,
        }
    }
}

impl Default for LengthPolicy {
    fn default() -> Self {
        Self {
            name: 2,
            address: 6,
            code: 2,
        }
    }
}

/// Apply `rules` in order and return the first acceptable capture.
///
/// Only the first match of each rule is considered. A capture shorter than
/// the policy allows is discarded and the next rule is tried.
pub fn first_match(rules: &[FieldRule], text: &str, policy: &LengthPolicy) -> Option<String> {
    rules.iter().find_map(|rule| {
        let value = rule.pattern.captures(text)?.get(1)?.as_str().trim();
        (value.chars().count() >= policy.min_len(rule.kind)).then(|| value.to_string())
    })
}
