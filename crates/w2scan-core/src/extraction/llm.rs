//! Language-model W-2 extraction.
//!
//! The model is asked for one JSON object keyed by the canonical field names.
//! The object is cut out of the reply (first `{` to last `}`), parsed, and
//! merged into a [`W2Record`] so unknown keys are dropped and missing ones
//! stay empty.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::gemini::GeminiClient;
use super::{FieldStrategy, Result};
use crate::error::LlmError;
use crate::models::config::LlmConfig;
use crate::models::record::{FieldName, W2Record};

/// Something that turns a prompt into free text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier, for logs.
    fn model_name(&self) -> &str;

    /// Send `prompt` and return the reply text.
    async fn generate(&self, prompt: &str) -> std::result::Result<String, LlmError>;
}

/// Field extraction backed by a [`TextGenerator`].
pub struct LlmStrategy {
    generator: Option<Box<dyn TextGenerator>>,
    max_input_chars: usize,
}

impl LlmStrategy {
    /// Create a strategy around a generator.
    pub fn new(generator: Box<dyn TextGenerator>) -> Self {
        Self {
            generator: Some(generator),
            max_input_chars: 4000,
        }
    }

    /// A strategy with no model behind it. Always reports unavailable.
    pub fn unavailable() -> Self {
        Self {
            generator: None,
            max_input_chars: 4000,
        }
    }

    /// Build the Gemini-backed strategy, or an unavailable one when disabled
    /// or when no API key is set.
    pub fn from_config(config: &LlmConfig) -> Self {
        if !config.enabled {
            info!("LLM extraction disabled by configuration");
            return Self::unavailable();
        }

        match GeminiClient::from_config(config) {
            Ok(client) => {
                info!("LLM extraction enabled with model {}", client.model_name());
                Self::new(Box::new(client)).with_max_input_chars(config.max_input_chars)
            }
            Err(e) => {
                info!("LLM extraction unavailable: {}", e);
                Self::unavailable()
            }
        }
    }

    /// Set how many characters of document text go into the prompt.
    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }
}

#[async_trait]
impl FieldStrategy for LlmStrategy {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn is_available(&self) -> bool {
        self.generator.is_some()
    }

    async fn extract(&self, text: &str) -> Result<W2Record> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| LlmError::Unavailable("no model configured".to_string()))?;

        let prompt = build_prompt(text, self.max_input_chars);
        debug!(
            "Sending {} char prompt to {}",
            prompt.len(),
            generator.model_name()
        );

        let reply = generator.generate(&prompt).await?;
        let record = parse_response(&reply).inspect_err(|e| {
            warn!("Unusable reply from {}: {}", generator.model_name(), e);
        })?;

        debug!("Model returned {} filled fields", record.filled_count());
        Ok(record)
    }
}

fn field_hint(field: FieldName) -> &'static str {
    match field {
        FieldName::EmployeeName => "Full name of employee",
        FieldName::EmployeeSsn => "Social Security Number (format: XXX-XX-XXXX)",
        FieldName::EmployeeAddress => "Complete street address of employee",
        FieldName::EmployeeCityStateZip => "City, State ZIP code of employee",
        FieldName::EmployerName => "Name of employer/company",
        FieldName::EmployerEin => "Employer Identification Number (format: XX-XXXXXXX)",
        FieldName::EmployerAddress => "Complete street address of employer",
        FieldName::EmployerCityStateZip => "City, State ZIP code of employer",
        FieldName::WagesTips => "Box 1 - Wages, tips, other compensation",
        FieldName::FederalIncomeTax => "Box 2 - Federal income tax withheld",
        FieldName::SocialSecurityWages => "Box 3 - Social security wages",
        FieldName::SocialSecurityTax => "Box 4 - Social security tax withheld",
        FieldName::MedicareWages => "Box 5 - Medicare wages and tips",
        FieldName::MedicareTax => "Box 6 - Medicare tax withheld",
        FieldName::StateWages => "Box 16 - State wages, tips, etc.",
        FieldName::StateIncomeTax => "Box 17 - State income tax",
        FieldName::LocalWages => "Box 18 - Local wages, tips, etc.",
        FieldName::LocalIncomeTax => "Box 19 - Local income tax",
        FieldName::ControlNumber => "Box d - Control number",
    }
}

/// First `max_chars` characters of `text`.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Build the extraction prompt for (the head of) `text`.
pub fn build_prompt(text: &str, max_input_chars: usize) -> String {
    let fields = FieldName::ALL
        .iter()
        .map(|f| {
            let suffix = if f.is_monetary() { " (numeric value only)" } else { "" };
            format!("    \"{}\": \"{}{}\"", f.key(), field_hint(*f), suffix)
        })
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "You are an expert at extracting information from W-2 tax forms. \
Analyze the following text from a W-2 form and extract the key information as JSON.\n\n\
Text from W-2 form:\n{text}\n\n\
Extract the following fields and return ONLY a valid JSON object:\n{{\n{fields}\n}}\n\n\
Rules:\n\
1. If a field is not found, use empty string \"\"\n\
2. For monetary values, extract only the number (e.g., \"75000.00\" not \"$75,000.00\")\n\
3. Use the exact formats XXX-XX-XXXX for SSN and XX-XXXXXXX for EIN\n\
4. Return ONLY the JSON object, no additional text\n\
5. Use the field names exactly as shown above\n",
        text = truncate_chars(text, max_input_chars),
        fields = fields,
    )
}

/// The substring from the first `{` to the last `}`, inclusive.
pub fn json_span(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}

/// Cut the JSON object out of a model reply and merge it into a record.
pub fn parse_response(reply: &str) -> std::result::Result<W2Record, LlmError> {
    let span = json_span(reply.trim()).ok_or(LlmError::NoJson)?;

    match serde_json::from_str::<Value>(span) {
        Ok(Value::Object(object)) => Ok(W2Record::from_json_object(&object)),
        Ok(other) => Err(LlmError::InvalidJson(format!(
            "expected an object, got {}",
            other
        ))),
        Err(e) => Err(LlmError::InvalidJson(e.to_string())),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Replies with canned text, or fails like an API error.
    pub(crate) struct CannedGenerator {
        reply: std::result::Result<String, String>,
    }

    impl CannedGenerator {
        pub(crate) fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
            }
        }

        pub(crate) fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        fn model_name(&self) -> &str {
            "canned"
        }

        async fn generate(&self, prompt: &str) -> std::result::Result<String, LlmError> {
            assert!(prompt.contains("W-2"));
            self.reply.clone().map_err(|message| LlmError::Api {
                status: 500,
                message,
            })
        }
    }

    #[test]
    fn test_json_span_between_first_and_last_brace() {
        let reply = r#"Here is the data: {"employee_name": "Jane Doe"} Thanks"#;
        assert_eq!(json_span(reply), Some(r#"{"employee_name": "Jane Doe"}"#));
        assert_eq!(json_span("no braces at all"), None);
        assert_eq!(json_span("} backwards {"), None);
    }

    #[test]
    fn test_parse_response_extracts_embedded_object() {
        let reply = r#"Here is the data: {"employee_name": "Jane Doe"} Thanks"#;
        let record = parse_response(reply).unwrap();

        assert_eq!(record.employee_name, "Jane Doe");
        assert_eq!(record.filled_count(), 1);
    }

    #[test]
    fn test_parse_response_handles_fenced_json() {
        let reply = "```json\n{\n  \"employer_ein\": \"12-3456789\",\n  \"wages_tips\": \"75000.00\"\n}\n```";
        let record = parse_response(reply).unwrap();

        assert_eq!(record.employer_ein, "12-3456789");
        assert_eq!(record.wages_tips, "75000.00");
    }

    #[test]
    fn test_parse_response_errors() {
        assert!(matches!(parse_response("I could not read it."), Err(LlmError::NoJson)));
        assert!(matches!(
            parse_response("{not json}"),
            Err(LlmError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_prompt_lists_every_field_and_truncates() {
        let text = "x".repeat(5000);
        let prompt = build_prompt(&text, 4000);

        for field in FieldName::ALL {
            assert!(prompt.contains(&format!("\"{}\"", field.key())), "{}", field.key());
        }
        assert!(prompt.contains(&"x".repeat(4000)));
        assert!(!prompt.contains(&"x".repeat(4001)));
        assert!(prompt.contains("XXX-XX-XXXX"));
        assert!(prompt.contains("XX-XXXXXXX"));
    }

    #[test]
    fn test_only_amount_fields_ask_for_numbers() {
        let prompt = build_prompt("text", 100);

        assert!(prompt.contains(
            "\"wages_tips\": \"Box 1 - Wages, tips, other compensation (numeric value only)\""
        ));
        assert!(prompt.contains("\"control_number\": \"Box d - Control number\""));
        assert_eq!(prompt.matches("(numeric value only)").count(), 10);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("żółw", 2), "żó");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[tokio::test]
    async fn test_extract_through_generator() {
        let strategy = LlmStrategy::new(Box::new(CannedGenerator::replying(
            r#"Sure! {"employee_ssn": "123-45-6789", "made_up": "x"}"#,
        )));

        assert!(strategy.is_available());
        let record = strategy.extract("SSN 123-45-6789").await.unwrap();
        assert_eq!(record.employee_ssn, "123-45-6789");
        assert_eq!(record.filled_count(), 1);
    }

    #[tokio::test]
    async fn test_extract_without_json_is_an_error() {
        let strategy = LlmStrategy::new(Box::new(CannedGenerator::replying("Sorry, no.")));
        assert!(strategy.extract("text").await.is_err());
    }

    #[tokio::test]
    async fn test_unavailable_strategy() {
        let strategy = LlmStrategy::unavailable();
        assert!(!strategy.is_available());
        assert!(strategy.extract("text").await.is_err());
    }

    #[test]
    fn test_disabled_config_is_unavailable() {
        let config = LlmConfig {
            enabled: false,
            ..LlmConfig::default()
        };
        assert!(!LlmStrategy::from_config(&config).is_available());
    }
}
