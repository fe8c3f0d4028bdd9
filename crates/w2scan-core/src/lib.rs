//! Core library for W-2 form scanning.
//!
//! This crate provides:
//! - PDF text extraction with a page-by-page fallback
//! - W-2 field extraction through a language model, falling back to regex rules
//! - Sequential batch processing with per-document skips

pub mod batch;
pub mod error;
pub mod extraction;
pub mod models;
pub mod pdf;

pub use batch::{BatchProcessor, BatchReport, BatchResult, BatchStats, Document, SkippedDocument};
pub use error::{ExtractionError, LlmError, PdfError, Result, W2Error};
pub use extraction::{
    DocumentParser, ExtractionCoordinator, FieldStrategy, GeminiClient, LlmStrategy, ParseResult,
    PatternStrategy, TextGenerator,
};
pub use models::{FieldName, W2Config, W2Record};
pub use pdf::{PdfExtractor, PdfProcessor, PdfTextExtractor, TextExtraction, TextMethod};
