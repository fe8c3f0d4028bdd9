//! PDF processing module.

mod extractor;

pub use extractor::{PdfExtractor, PdfTextExtractor};

use tracing::debug;

#[cfg(test)]
pub(crate) use extractor::tests::text_pdf;

use crate::error::PdfError;

/// Which pass produced the document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextMethod {
    /// Layout-aware extraction over the whole document.
    Layout,
    /// Page-by-page content stream extraction.
    PageContent,
    /// Neither pass produced usable text.
    None,
    /// Text handed in by the caller, no PDF involved.
    Supplied,
}

/// Text pulled from a PDF, with the pass that produced it.
#[derive(Debug, Clone)]
pub struct TextExtraction {
    /// Extracted text, empty when nothing usable was found.
    pub text: String,
    /// Pass that produced `text`.
    pub method: TextMethod,
    /// Why extraction came up empty, when it did.
    pub failure: Option<String>,
}

impl TextExtraction {
    /// An empty extraction with a reason.
    pub fn empty(reason: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            method: TextMethod::None,
            failure: Some(reason.into()),
        }
    }

    /// True when no usable text was found.
    pub fn is_empty(&self) -> bool {
        self.method == TextMethod::None
    }
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract layout-aware text from the entire PDF.
    fn extract_text(&self) -> Result<String>;

    /// Extract content stream text from a specific page.
    fn extract_page_text(&self, page: u32) -> Result<String>;

    /// Concatenate the content stream text of every page.
    ///
    /// A page that fails to extract contributes nothing.
    fn extract_page_content(&self) -> String {
        let mut text = String::new();

        for page in 1..=self.page_count() {
            match self.extract_page_text(page) {
                Ok(page_text) => {
                    text.push_str(&page_text);
                    if !text.is_empty() && !text.ends_with('\n') {
                        text.push('\n');
                    }
                }
                Err(e) => {
                    debug!("Page {} text extraction failed: {}", page, e);
                }
            }
        }

        text
    }
}
