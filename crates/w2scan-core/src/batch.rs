//! Sequential batch processing of W-2 documents.

use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ExtractionError;
use crate::extraction::{DocumentParser, ParseResult};
use crate::models::record::W2Record;
use crate::pdf::TextMethod;

/// A named PDF held in memory.
#[derive(Debug, Clone)]
pub struct Document {
    /// Display name, usually the file name.
    pub filename: String,
    /// Raw PDF bytes.
    pub data: Vec<u8>,
}

impl Document {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }

    /// Read a document from disk, named after the file.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(filename, data))
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// One successfully extracted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    #[serde(flatten)]
    pub record: W2Record,
    pub filename: String,
    /// Human-readable size, e.g. `"12.50 KB"`.
    pub file_size: String,
    /// Local time, `YYYY-MM-DD HH:MM:SS`.
    pub processing_timestamp: String,
    /// Strategy that produced the record.
    pub extracted_by: String,
}

impl BatchResult {
    /// Attach file metadata and the current local time to a record.
    pub fn new(record: W2Record, doc: &Document, extracted_by: &str) -> Self {
        Self {
            record,
            filename: doc.filename.clone(),
            file_size: human_size(doc.size()),
            processing_timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            extracted_by: extracted_by.to_string(),
        }
    }
}

/// A document that produced no record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub filename: String,
    pub reason: String,
}

/// Summary counts over a batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchStats {
    /// Documents with a record.
    pub forms: usize,
    /// Non-empty record fields across all results.
    pub fields_extracted: usize,
    /// `fields_extracted / forms`, zero for an empty batch.
    pub avg_fields_per_form: f64,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Results in input order.
    pub results: Vec<BatchResult>,
    /// Documents that were skipped, in input order.
    pub skipped: Vec<SkippedDocument>,
}

impl BatchReport {
    /// Record a skipped document.
    pub fn skip(&mut self, filename: impl Into<String>, reason: impl Into<String>) {
        let filename = filename.into();
        let reason = reason.into();
        warn!("Skipping {}: {}", filename, reason);
        self.skipped.push(SkippedDocument { filename, reason });
    }

    pub fn stats(&self) -> BatchStats {
        let forms = self.results.len();
        let fields_extracted = self.results.iter().map(|r| r.record.filled_count()).sum();
        let avg_fields_per_form = if forms == 0 {
            0.0
        } else {
            fields_extracted as f64 / forms as f64
        };

        BatchStats {
            forms,
            fields_extracted,
            avg_fields_per_form,
        }
    }
}

/// Format a byte count as kilobytes with two decimals.
pub fn human_size(bytes: usize) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

/// Runs a [`DocumentParser`] over many documents, one at a time.
pub struct BatchProcessor<P> {
    parser: P,
}

impl<P: DocumentParser> BatchProcessor<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }

    /// The wrapped parser.
    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Process every document in order.
    pub async fn process_all(&self, documents: &[Document]) -> BatchReport {
        self.process_all_with_progress(documents, |_, _| {}).await
    }

    /// Process every document in order, calling `on_done(index, document)`
    /// after each one.
    pub async fn process_all_with_progress<F>(
        &self,
        documents: &[Document],
        mut on_done: F,
    ) -> BatchReport
    where
        F: FnMut(usize, &Document),
    {
        let mut report = BatchReport::default();

        for (index, doc) in documents.iter().enumerate() {
            self.process_one(doc, &mut report).await;
            on_done(index, doc);
        }

        log_done(&report);
        report
    }

    /// Read and process files in order, calling `on_done(index, path)` after
    /// each one.
    ///
    /// A file that cannot be read is skipped where it stands, so `skipped`
    /// keeps input order across read and extraction failures.
    pub async fn process_paths_with_progress<F>(
        &self,
        paths: &[PathBuf],
        mut on_done: F,
    ) -> BatchReport
    where
        F: FnMut(usize, &Path),
    {
        let mut report = BatchReport::default();

        for (index, path) in paths.iter().enumerate() {
            match Document::from_path(path) {
                Ok(doc) => self.process_one(&doc, &mut report).await,
                Err(e) => {
                    report.skip(path.display().to_string(), format!("cannot read file: {}", e))
                }
            }
            on_done(index, path);
        }

        log_done(&report);
        report
    }

    async fn process_one(&self, doc: &Document, report: &mut BatchReport) {
        match self.parser.parse_document(&doc.data).await {
            Ok(parsed) if !parsed.record.is_empty() => {
                let strategy = parsed.strategy.unwrap_or_default();
                report.results.push(BatchResult::new(parsed.record, doc, strategy));
            }
            Ok(parsed) => report.skip(&doc.filename, skip_reason(&parsed)),
            Err(e) => report.skip(&doc.filename, e.to_string()),
        }
    }
}

/// Why a parse with an empty record was skipped, with the last warning as detail.
fn skip_reason(parsed: &ParseResult) -> String {
    let error = if parsed.text_method == TextMethod::None {
        ExtractionError::NoText
    } else {
        ExtractionError::NoData
    };

    match parsed.warnings.last() {
        Some(detail) => format!("{}: {}", error, detail),
        None => error.to_string(),
    }
}

fn log_done(report: &BatchReport) {
    info!(
        "Batch done: {} extracted, {} skipped",
        report.results.len(),
        report.skipped.len()
    );
}
