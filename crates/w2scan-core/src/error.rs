//! Error types for the w2scan-core library.

use thiserror::Error;

/// Main error type for the w2scan library.
#[derive(Error, Debug)]
pub enum W2Error {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Language model error.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// W-2 field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors raised while talking to the language model.
#[derive(Error, Debug)]
pub enum LlmError {
    /// No credential or client configured.
    #[error("language model unavailable: {0}")]
    Unavailable(String),

    /// HTTP transport failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The API answered but carried no candidate text.
    #[error("model returned no text")]
    EmptyResponse,

    /// The response text had no `{ ... }` span.
    #[error("no JSON object in model response")]
    NoJson,

    /// The `{ ... }` span was not a valid JSON object.
    #[error("invalid JSON in model response: {0}")]
    InvalidJson(String),
}

/// Errors related to W-2 field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// No usable text could be pulled from the document.
    #[error("no text extracted from document")]
    NoText,

    /// No W-2 field could be extracted.
    #[error("no W-2 data found")]
    NoData,

    /// The language model strategy failed.
    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Result type for the w2scan library.
pub type Result<T> = std::result::Result<T, W2Error>;
