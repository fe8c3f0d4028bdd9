//! Process command - extract W-2 fields from a single PDF.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use w2scan_core::{BatchResult, Document, FieldName, TextMethod};

use super::{build_coordinator, load_config};
use crate::export;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Use pattern extraction only, even when an API key is set
    #[arg(long)]
    no_llm: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let doc = Document::from_path(&args.input)?;
    info!("Processing file: {} ({} bytes)", doc.filename, doc.size());

    let coordinator = build_coordinator(&config, args.no_llm);
    debug!("Strategy order: {:?}", coordinator.strategy_names());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Extracting fields from {}...", doc.filename));

    let parsed = coordinator.parse(&doc.data).await;
    spinner.finish_and_clear();

    for warning in &parsed.warnings {
        warn!("{}", warning);
    }

    if parsed.text_method == TextMethod::None {
        anyhow::bail!(
            "No text could be extracted from {}: {}",
            doc.filename,
            parsed.warnings.join("; ")
        );
    }

    let Some(strategy) = parsed.strategy else {
        anyhow::bail!("No W-2 fields found in {}", doc.filename);
    };

    let result = BatchResult::new(parsed.record, &doc, strategy);
    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    eprintln!(
        "{} Extracted {} fields with {} in {}ms",
        style("ℹ").blue(),
        result.record.filled_count(),
        style(strategy).cyan(),
        parsed.processing_time_ms
    );

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_result(result: &BatchResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => export::csv_string(std::slice::from_ref(result)),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_text(result: &BatchResult) -> String {
    let mut output = format!("W-2: {} ({})\n\n", result.filename, result.file_size);

    let width = FieldName::ALL
        .iter()
        .map(|f| f.key().len())
        .max()
        .unwrap_or(0);

    for field in FieldName::ALL {
        let value = result.record.get(field);
        if !value.is_empty() {
            output.push_str(&format!("  {:<width$}  {}\n", field.key(), value, width = width));
        }
    }

    if !result.record.other_info.is_empty() {
        output.push_str(&format!("\nOther: {}\n", result.record.other_info.join(", ")));
    }

    output.push_str(&format!(
        "\nExtracted by {} at {}\n",
        result.extracted_by, result.processing_timestamp
    ));
    output
}
