//! Google Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::llm::TextGenerator;
use crate::error::LlmError;
use crate::models::config::LlmConfig;

/// Gemini API client.
pub struct GeminiClient {
    api_key: String,
    model: String,
    endpoint: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a client with an explicit API key and the configured model,
    /// endpoint and timeout.
    pub fn new(api_key: String, config: &LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            api_key,
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create a client from configuration, reading the key from the
    /// configured environment variable.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| LlmError::Unavailable(format!("{} is not set", config.api_key_env)))?;

        Self::new(api_key, config)
    }

    /// Full `generateContent` URL. Accepts model names with or without the
    /// `models/` prefix.
    pub fn url(&self) -> String {
        let model = self.model.strip_prefix("models/").unwrap_or(&self.model);
        format!("{}/models/{}:generateContent", self.endpoint, model)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

/// Concatenated text parts of the first candidate.
fn response_text(body: &str) -> Result<String, LlmError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| LlmError::InvalidJson(e.to_string()))?;

    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        debug!("Gemini answered {} with {} bytes", status, body.len());

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {status}: {body}"));
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response_text(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_normalizes_model_and_endpoint() {
        let plain = GeminiClient::new("k".to_string(), &LlmConfig::default()).unwrap();
        let prefixed = GeminiClient::new(
            "k".to_string(),
            &LlmConfig {
                model: "models/gemini-1.5-pro".to_string(),
                endpoint: "https://generativelanguage.googleapis.com/v1beta/".to_string(),
                ..LlmConfig::default()
            },
        )
        .unwrap();

        let expected =
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent";
        assert_eq!(plain.url(), expected);
        assert_eq!(prefixed.url(), expected);
    }

    #[test]
    fn test_response_text_joins_parts_of_first_candidate() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "{\"employee_name\": "}, {"text": "\"Jane\"}"}], "role": "model"}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }"#;
        assert_eq!(response_text(body).unwrap(), r#"{"employee_name": "Jane"}"#);
    }

    #[test]
    fn test_response_without_candidates_is_empty() {
        assert!(matches!(
            response_text(r#"{"candidates": []}"#),
            Err(LlmError::EmptyResponse)
        ));
        assert!(matches!(response_text("{}"), Err(LlmError::EmptyResponse)));
        assert!(matches!(
            response_text("not json"),
            Err(LlmError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_missing_key_is_unavailable() {
        let config = LlmConfig {
            api_key_env: "W2SCAN_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..LlmConfig::default()
        };
        assert!(matches!(
            GeminiClient::from_config(&config),
            Err(LlmError::Unavailable(_))
        ));
    }
}
