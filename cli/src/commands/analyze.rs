//! Analyze command implementation

use crate::output;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use pcaplens_analyzer::output::{json, table};
use pcaplens_analyzer::{analyze_file, AnalysisReport, AnalyzerConfig};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain-text tables
    Table,
    /// One JSON document
    Json,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Capture file (legacy pcap)
    pub file: PathBuf,

    /// TOML configuration file
    #[arg(short, long, env = "PCAPLENS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Also write the report as JSON to this path
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Format printed to stdout
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

pub async fn run(args: AnalyzeArgs) -> Result<()> {
    let config = AnalyzerConfig::load(args.config.as_deref())?;

    let path = args.file.clone();
    let report = tokio::task::spawn_blocking(move || analyze_file(&path, &config))
        .await
        .context("Analysis task failed")??;

    report_status(&report);

    if let Some(json_path) = &args.json {
        json::write_json(&report, json_path)?;
        output::success(&format!("JSON report written to {}", json_path.display()));
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::Table => table::write_report(&report, &mut out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &report)
                .context("Failed to serialize report to JSON")?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    Ok(())
}

fn report_status(report: &AnalysisReport) {
    let summary = &report.summary;
    output::success(&format!(
        "Scanned {} records ({} decoded)",
        summary.records(),
        summary.processed
    ));

    if summary.errors > 0 {
        output::info(&format!("{} records could not be decoded", summary.errors));
    }
    if let Some(e) = &summary.stream_error {
        output::warning(&format!("Capture ended early: {}", e));
    }
    for (name, count) in &summary.collector_failures {
        output::warning(&format!("{} failed on {} packets", name, count));
    }
}
