//! JSON output
//!
//! Exports the analysis report as one JSON document

use crate::analysis::AnalysisReport;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Write the report to `output_path`; the parent directory must exist
pub fn write_json(report: &AnalysisReport, output_path: &Path) -> Result<()> {
    info!("Writing JSON report: {}", output_path.display());

    let file = File::create(output_path)
        .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .context("Failed to serialize report to JSON")?;
    writer.flush().context("Failed to flush JSON report")?;

    info!("JSON report written to {}", output_path.display());
    Ok(())
}

/// Pretty-printed report
pub fn to_string(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
}
