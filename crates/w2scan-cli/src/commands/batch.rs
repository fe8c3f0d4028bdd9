//! Batch command - extract W-2 fields from many PDFs and export them.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use w2scan_core::{BatchProcessor, BatchReport};

use super::{build_coordinator, load_config};
use crate::export::{export_results, ExportOptions};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input PDFs (e.g. "forms/*.pdf")
    #[arg(required = true)]
    input: String,

    /// Output directory for the exports
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Use pattern extraction only, even when an API key is set
    #[arg(long)]
    no_llm: bool,

    /// Skip the summary CSV
    #[arg(long)]
    no_csv: bool,

    /// Skip the structured JSON
    #[arg(long)]
    no_json: bool,
}

pub async fn run(args: BatchArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No PDF files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} PDF files to process",
        style("ℹ").blue(),
        files.len()
    );

    let processor = BatchProcessor::new(build_coordinator(&config, args.no_llm));
    debug!("Strategy order: {:?}", processor.parser().strategy_names());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let report = processor
        .process_paths_with_progress(&files, |_, path| {
            pb.set_message(path.display().to_string());
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();

    print_summary(&report, start);

    if report.results.is_empty() {
        println!(
            "{} No W-2 data could be extracted, nothing exported",
            style("!").yellow()
        );
        return Ok(());
    }

    let options = ExportOptions {
        output_dir: args.output_dir.unwrap_or(config.export.output_dir),
        file_prefix: config.export.file_prefix,
        csv: config.export.csv && !args.no_csv,
        json: config.export.json && !args.no_json,
    };

    for path in export_results(&report.results, &options, &Local::now())? {
        println!("{} Wrote {}", style("✓").green(), path.display());
    }

    Ok(())
}

fn print_summary(report: &BatchReport, start: Instant) {
    let stats = report.stats();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        report.results.len() + report.skipped.len(),
        start.elapsed()
    );
    println!("   Forms processed:   {}", style(stats.forms).green());
    println!("   Fields extracted:  {}", stats.fields_extracted);
    println!("   Avg fields/form:   {:.1}", stats.avg_fields_per_form);

    if !report.skipped.is_empty() {
        println!();
        println!("{}", style(format!("Skipped files ({}):", report.skipped.len())).red());
        for skipped in &report.skipped {
            println!("  - {}: {}", skipped.filename, skipped.reason);
        }
    }
}
