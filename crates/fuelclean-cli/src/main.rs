//! fuelclean CLI - Fuel Distribution Spreadsheet Cleaner
//!
//! Reads one or more distribution workbooks, runs the cleaning pipeline, and
//! writes a workbook with the cleaned data sheet and the category summary.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fuelclean_core::{CleanConfig, ProgressSink};
use fuelclean_import::load_workbook;
use fuelclean_pipeline::clean;
use fuelclean_render::ExcelWriter;

#[derive(Parser)]
#[command(name = "fuelclean")]
#[command(author, version, about = "Clean and summarize fuel distribution workbooks", long_about = None)]
struct Cli {
    /// Input workbooks (.xlsx); unreadable files are skipped with a warning
    #[arg(value_name = "FILE", required = true)]
    inputs: Vec<PathBuf>,

    /// Output workbook path
    #[arg(short, long, default_value = "cleaned.xlsx")]
    output: PathBuf,

    /// Pipeline configuration file (TOML); defaults are used when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip the embedded pie chart
    #[arg(long)]
    no_chart: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Progress sink that forwards stage reports to the log
struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&mut self, percent: u8, stage: &str) {
        info!(percent, "{stage}");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            toml::from_str::<CleanConfig>(&raw)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => CleanConfig::default(),
    };

    let mut inputs = Vec::new();
    for path in &cli.inputs {
        match load_workbook(path) {
            Ok(workbook) => {
                info!(path = %path.display(), sheets = workbook.sheet_names.len(), "loaded workbook");
                inputs.push(workbook);
            }
            Err(e) => {
                warn!(path = %path.display(), "skipping unreadable workbook: {e}");
            }
        }
    }
    if inputs.is_empty() {
        bail!("none of the input files could be read as a workbook");
    }

    let output = clean(&inputs, &config, &mut LogProgress).context("pipeline failed")?;

    let mut writer = ExcelWriter::new().summary_sheet(&config.summary_sheet);
    if cli.no_chart {
        writer = writer.no_chart();
    }
    writer
        .save(&output, &cli.output)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    println!(
        "Wrote {} ({} records, {:.1} total unified fuel)",
        cli.output.display(),
        output.data.height().saturating_sub(1),
        output.summary.grand_total,
    );

    Ok(())
}
