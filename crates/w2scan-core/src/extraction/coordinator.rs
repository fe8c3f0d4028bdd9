//! Ordered strategy fallback over extracted PDF text.

use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::llm::LlmStrategy;
use super::pattern::PatternStrategy;
use super::FieldStrategy;
use crate::models::config::W2Config;
use crate::models::record::W2Record;
use crate::pdf::{PdfTextExtractor, TextMethod};

/// Result of parsing one document.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Extracted record, empty when nothing was found.
    pub record: W2Record,
    /// Name of the strategy that produced `record`, if any did.
    pub strategy: Option<&'static str>,
    /// Which text pass was used.
    pub text_method: TextMethod,
    /// Problems met along the way.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ParseResult {
    fn empty(text_method: TextMethod, warnings: Vec<String>, start: Instant) -> Self {
        Self {
            record: W2Record::new(),
            strategy: None,
            text_method,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Anything that turns document bytes into a [`ParseResult`].
#[async_trait]
pub trait DocumentParser: Send + Sync {
    /// Parse one PDF document.
    async fn parse_document(&self, data: &[u8]) -> crate::Result<ParseResult>;
}

/// Runs text extraction, then each available strategy in order until one
/// returns a non-empty record.
pub struct ExtractionCoordinator {
    text_extractor: PdfTextExtractor,
    strategies: Vec<Box<dyn FieldStrategy>>,
}

impl ExtractionCoordinator {
    /// Create a coordinator with an explicit strategy order.
    pub fn new(text_extractor: PdfTextExtractor, strategies: Vec<Box<dyn FieldStrategy>>) -> Self {
        Self {
            text_extractor,
            strategies,
        }
    }

    /// Language model first (when configured and available), then patterns.
    pub fn from_config(config: &W2Config) -> Self {
        let mut strategies: Vec<Box<dyn FieldStrategy>> = Vec::new();

        let llm = LlmStrategy::from_config(&config.llm);
        if llm.is_available() {
            strategies.push(Box::new(llm));
        }
        strategies.push(Box::new(PatternStrategy::from_config(&config.extraction)));

        Self::new(
            PdfTextExtractor::new().with_min_text_length(config.pdf.min_text_length),
            strategies,
        )
    }

    /// Patterns only, no network.
    pub fn pattern_only(config: &W2Config) -> Self {
        Self::new(
            PdfTextExtractor::new().with_min_text_length(config.pdf.min_text_length),
            vec![Box::new(PatternStrategy::from_config(&config.extraction))],
        )
    }

    /// Strategy names in the order they are tried.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Parse PDF bytes.
    pub async fn parse(&self, data: &[u8]) -> ParseResult {
        let start = Instant::now();
        let extraction = self.text_extractor.extract(data);

        if extraction.is_empty() {
            let reason = extraction
                .failure
                .unwrap_or_else(|| "no text extracted".to_string());
            warn!("Skipping field extraction: {}", reason);
            return ParseResult::empty(TextMethod::None, vec![reason], start);
        }

        self.run_strategies(&extraction.text, extraction.method, start).await
    }

    /// Run the strategies over already-extracted text.
    ///
    /// The result reports [`TextMethod::Supplied`] unless `text` is blank.
    pub async fn parse_text(&self, text: &str) -> ParseResult {
        let start = Instant::now();
        if text.trim().is_empty() {
            return ParseResult::empty(TextMethod::None, vec!["empty text".to_string()], start);
        }
        self.run_strategies(text, TextMethod::Supplied, start).await
    }

    async fn run_strategies(
        &self,
        text: &str,
        text_method: TextMethod,
        start: Instant,
    ) -> ParseResult {
        let mut warnings = Vec::new();

        for strategy in &self.strategies {
            if !strategy.is_available() {
                debug!("Strategy {} unavailable, skipping", strategy.name());
                continue;
            }

            match strategy.extract(text).await {
                Ok(record) if !record.is_empty() => {
                    info!(
                        "Strategy {} extracted {} fields",
                        strategy.name(),
                        record.filled_count()
                    );
                    return ParseResult {
                        record,
                        strategy: Some(strategy.name()),
                        text_method,
                        warnings,
                        processing_time_ms: start.elapsed().as_millis() as u64,
                    };
                }
                Ok(_) => {
                    debug!("Strategy {} found nothing", strategy.name());
                    warnings.push(format!("{}: no fields found", strategy.name()));
                }
                Err(e) => {
                    warn!("Strategy {} failed: {}", strategy.name(), e);
                    warnings.push(format!("{}: {}", strategy.name(), e));
                }
            }
        }

        ParseResult::empty(text_method, warnings, start)
    }
}

#[async_trait]
impl DocumentParser for ExtractionCoordinator {
    async fn parse_document(&self, data: &[u8]) -> crate::Result<ParseResult> {
        Ok(self.parse(data).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::llm::tests::CannedGenerator;
    use crate::pdf::text_pdf;
    use pretty_assertions::assert_eq;

    fn llm_then_pattern(generator: CannedGenerator) -> ExtractionCoordinator {
        ExtractionCoordinator::new(
            PdfTextExtractor::new(),
            vec![
                Box::new(LlmStrategy::new(Box::new(generator))),
                Box::new(PatternStrategy::new()),
            ],
        )
    }

    #[tokio::test]
    async fn test_empty_text_gives_empty_record() {
        let coordinator = ExtractionCoordinator::pattern_only(&W2Config::default());

        let result = coordinator.parse(b"not a pdf").await;
        assert!(result.record.is_empty());
        assert_eq!(result.strategy, None);
        assert_eq!(result.text_method, TextMethod::None);
        assert_eq!(result.warnings.len(), 1);

        let result = coordinator.parse_text("   \n ").await;
        assert!(result.record.is_empty());
        assert_eq!(result.text_method, TextMethod::None);
    }

    #[tokio::test]
    async fn test_llm_without_json_falls_back_to_pattern() {
        let coordinator = llm_then_pattern(CannedGenerator::replying("I cannot help with that."));

        let result = coordinator.parse_text("SSN: 123-45-6789").await;
        assert_eq!(result.strategy, Some("pattern"));
        assert_eq!(result.text_method, TextMethod::Supplied);
        assert_eq!(result.record.employee_ssn, "123-45-6789");
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].starts_with("gemini:"));
    }

    #[tokio::test]
    async fn test_llm_error_falls_back_to_pattern() {
        let coordinator = llm_then_pattern(CannedGenerator::failing("quota exceeded"));

        let result = coordinator.parse_text("EIN: 12-3456789").await;
        assert_eq!(result.strategy, Some("pattern"));
        assert_eq!(result.record.employer_ein, "12-3456789");
        assert!(result.warnings[0].contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_first_non_empty_result_is_returned_as_is() {
        let coordinator = llm_then_pattern(CannedGenerator::replying(
            r#"{"employee_name": "Jane Doe"}"#,
        ));

        // Patterns would find the SSN, but the model answered first.
        let result = coordinator.parse_text("SSN: 123-45-6789").await;
        assert_eq!(result.strategy, Some("gemini"));
        assert_eq!(result.record.employee_name, "Jane Doe");
        assert_eq!(result.record.employee_ssn, "");
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_empty_llm_record_falls_back() {
        let coordinator = llm_then_pattern(CannedGenerator::replying(r#"{"employee_name": ""}"#));

        let result = coordinator.parse_text("Box 2: 1,234.00").await;
        assert_eq!(result.strategy, Some("pattern"));
        assert_eq!(result.record.federal_income_tax, "1,234.00");
    }

    #[tokio::test]
    async fn test_unavailable_strategy_is_skipped() {
        let coordinator = ExtractionCoordinator::new(
            PdfTextExtractor::new(),
            vec![
                Box::new(LlmStrategy::unavailable()),
                Box::new(PatternStrategy::new()),
            ],
        );

        let result = coordinator.parse_text("SSN: 123-45-6789").await;
        assert_eq!(result.strategy, Some("pattern"));
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_nothing_found_anywhere() {
        let coordinator = ExtractionCoordinator::pattern_only(&W2Config::default());

        let result = coordinator.parse_text("lorem ipsum").await;
        assert!(result.record.is_empty());
        assert_eq!(result.strategy, None);
        assert_eq!(result.text_method, TextMethod::Supplied);
        assert_eq!(result.warnings, vec!["pattern: no fields found".to_string()]);
    }

    #[tokio::test]
    async fn test_parse_generated_pdf() {
        let data = text_pdf(&["SSN: 123-45-6789", "EIN: 12-3456789"]);
        let coordinator = ExtractionCoordinator::pattern_only(&W2Config::default());

        let result = coordinator.parse_document(&data).await.unwrap();
        assert_eq!(result.strategy, Some("pattern"));
        assert_ne!(result.text_method, TextMethod::None);
        assert_eq!(result.record.employee_ssn, "123-45-6789");
        assert_eq!(result.record.employer_ein, "12-3456789");
    }

    #[test]
    fn test_from_config_without_llm() {
        let mut config = W2Config::default();
        config.llm.enabled = false;

        let coordinator = ExtractionCoordinator::from_config(&config);
        assert_eq!(coordinator.strategy_names(), vec!["pattern"]);
    }
}
