//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, W2Error};

/// Main configuration for the w2scan pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct W2Config {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Language model configuration.
    pub llm: LlmConfig,

    /// Pattern extraction configuration.
    pub extraction: ExtractionConfig,

    /// Export configuration.
    pub export: ExportConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum non-whitespace characters for a text pass to count as usable.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_length: 1 }
    }
}

/// Language model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Try the language model before the pattern extractor.
    pub enabled: bool,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Model name.
    pub model: String,

    /// API base URL.
    pub endpoint: String,

    /// Characters of document text sent with the prompt.
    pub max_input_chars: usize,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: "GEMINI_API_KEY".to_string(),
            model: "gemini-1.5-pro".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            max_input_chars: 4000,
            timeout_secs: 60,
        }
    }
}

/// Pattern extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Minimum length of an accepted name capture.
    pub min_name_length: usize,

    /// Minimum length of an accepted address or city/state/ZIP capture.
    pub min_address_length: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_name_length: 2,
            min_address_length: 6,
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory export files are written to.
    pub output_dir: PathBuf,

    /// File name prefix, followed by a `_YYYYMMDD_HHMMSS` stamp.
    pub file_prefix: String,

    /// Write the summary CSV.
    pub csv: bool,

    /// Write the structured JSON.
    pub json: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            file_prefix: "w2_data".to_string(),
            csv: true,
            json: true,
        }
    }
}

impl W2Config {
    /// Load configuration from a JSON file.
    ///
    /// Missing sections and keys take their defaults. A file that is not
    /// valid config JSON is a [`W2Error::Config`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| W2Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
