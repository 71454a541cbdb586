//! Capture Analyzer Library
//!
//! This library provides the scanning pipeline for pcaplens: reading a
//! capture file, decoding every frame and feeding the traffic collectors,
//! then rendering the resulting views.

pub mod analysis;
pub mod collector;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod source;

pub use analysis::{Analysis, AnalysisReport};
pub use config::AnalyzerConfig;
pub use pipeline::{Pipeline, Summary};
pub use source::{PcapSource, SourceError};

use anyhow::{Context, Result};
use pcaplens_shared::Decoder;
use std::path::Path;
use tracing::info;

/// Scan one capture file with every collector and build the report.
///
/// Fails only when the configuration is invalid or the capture cannot be
/// opened; broken records are reported in the summary instead.
pub fn analyze_file(path: &Path, config: &AnalyzerConfig) -> Result<AnalysisReport> {
    config.validate().context("Invalid configuration")?;

    let source = PcapSource::open(path)
        .with_context(|| format!("Failed to open capture {}", path.display()))?;
    let info = source.info().clone();

    let mut analysis = Analysis::new(config);
    let summary = analysis.scan(Decoder::new(info.linktype), source.records());
    let report = analysis.finish(Some(info), summary)?;

    info!(
        "Analysis of {} complete: {} records, {} addresses, {} images",
        path.display(),
        report.summary.records(),
        report.traffic.len(),
        report.images.rows.len()
    );
    Ok(report)
}
