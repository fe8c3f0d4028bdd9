//! W-2 field extraction module.

mod coordinator;
pub mod gemini;
pub mod llm;
pub mod pattern;
pub mod rules;

pub use coordinator::{DocumentParser, ExtractionCoordinator, ParseResult};
pub use gemini::GeminiClient;
pub use llm::{LlmStrategy, TextGenerator};
pub use pattern::PatternStrategy;

use async_trait::async_trait;

use crate::error::ExtractionError;
use crate::models::record::W2Record;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// One way of turning document text into a W-2 record.
#[async_trait]
pub trait FieldStrategy: Send + Sync {
    /// Short name, reported alongside the records it produces.
    fn name(&self) -> &'static str;

    /// Whether the strategy can run at all (credentials, client, ...).
    fn is_available(&self) -> bool {
        true
    }

    /// Extract a record from plain text. An empty record means "nothing found".
    async fn extract(&self, text: &str) -> Result<W2Record>;
}
