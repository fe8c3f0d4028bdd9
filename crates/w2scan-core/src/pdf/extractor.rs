//! PDF text extraction using pdf-extract with a lopdf page-by-page fallback.

use std::panic::{self, AssertUnwindSafe};

use lopdf::Document;
use tracing::{debug, trace, warn};

use super::{PdfProcessor, Result, TextExtraction, TextMethod};
use crate::error::PdfError;

/// PDF content extractor using lopdf and pdf-extract.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads the raw bytes, so hand it the decrypted copy
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        if self.document.is_none() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }

        // pdf-extract panics on some malformed fonts
        let data = &self.raw_data;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(data)
        }));

        match outcome {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(PdfError::TextExtraction(e.to_string())),
            Err(_) => Err(PdfError::TextExtraction(
                "layout extraction panicked".to_string(),
            )),
        }
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self
            .document
            .as_ref()
            .ok_or(PdfError::Parse("No document loaded".to_string()))?;

        if !doc.get_pages().contains_key(&page) {
            return Err(PdfError::InvalidPage(page));
        }

        doc.extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}

/// Pulls plain text out of a PDF, degrading to an empty result instead of failing.
///
/// The layout-aware pass runs first; when it yields nothing usable the
/// page-by-page content pass is tried.
#[derive(Debug, Clone)]
pub struct PdfTextExtractor {
    min_text_length: usize,
}

impl PdfTextExtractor {
    /// Create an extractor that accepts any non-blank text.
    pub fn new() -> Self {
        Self { min_text_length: 1 }
    }

    /// Set the minimum number of non-whitespace characters for a usable pass.
    pub fn with_min_text_length(mut self, min_text_length: usize) -> Self {
        self.min_text_length = min_text_length.max(1);
        self
    }

    fn is_usable(&self, text: &str) -> bool {
        text.chars().filter(|c| !c.is_whitespace()).count() >= self.min_text_length
    }

    /// Extract text from PDF bytes.
    pub fn extract(&self, data: &[u8]) -> TextExtraction {
        let mut pdf = PdfExtractor::new();
        if let Err(e) = pdf.load(data) {
            warn!("Could not load PDF: {}", e);
            return TextExtraction::empty(e.to_string());
        }

        self.extract_from(&pdf)
    }

    /// Run the layout pass, then the page content pass, over a loaded PDF.
    fn extract_from<P: PdfProcessor>(&self, pdf: &P) -> TextExtraction {
        match pdf.extract_text() {
            Ok(text) if self.is_usable(&text) => {
                trace!("Layout pass produced {} chars", text.len());
                return TextExtraction {
                    text,
                    method: TextMethod::Layout,
                    failure: None,
                };
            }
            Ok(_) => debug!("Layout pass produced no text, trying page content"),
            Err(e) => debug!("Layout pass failed ({}), trying page content", e),
        }

        let text = pdf.extract_page_content();
        if self.is_usable(&text) {
            trace!("Page content pass produced {} chars", text.len());
            return TextExtraction {
                text,
                method: TextMethod::PageContent,
                failure: None,
            };
        }

        warn!("No text found in {}-page PDF", pdf.page_count());
        TextExtraction::empty("no extractable text (scanned or image-only PDF?)")
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}
