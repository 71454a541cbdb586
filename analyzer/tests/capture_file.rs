mod common;

use anyhow::Result;
use common::*;
use pcaplens_analyzer::{analyze_file, AnalyzerConfig, SourceError};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_capture(bytes: &[u8]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file)
}

#[test]
fn test_analyze_file_end_to_end() -> Result<()> {
    let file = write_capture(&mixed_capture().build())?;

    let report = analyze_file(file.path(), &AnalyzerConfig::default())?;

    assert_eq!(report.summary.processed, 9);
    assert_eq!(report.summary.errors, 1);
    assert_eq!(report.protocols.rows[0].packet_count, 6);
    assert_eq!(report.protocols.rows[1].packet_count, 3);
    assert_eq!(report.capture.as_ref().map(|c| c.snaplen), Some(65535));
    Ok(())
}

#[test]
fn test_configured_interval() -> Result<()> {
    let file = write_capture(&mixed_capture().build())?;
    let config = AnalyzerConfig {
        histogram_interval_secs: 60.0,
        ..AnalyzerConfig::default()
    };

    let report = analyze_file(file.path(), &config)?;

    assert_eq!(report.histogram.buckets.len(), 1);
    assert_eq!(report.histogram.buckets[0].count, 9);
    assert_eq!(report.histogram.threshold, None);
    Ok(())
}

#[test]
fn test_missing_file_fails_before_scanning() {
    let err = analyze_file(
        std::path::Path::new("/nonexistent/capture.pcap"),
        &AnalyzerConfig::default(),
    )
    .unwrap_err();

    let source = err.downcast_ref::<SourceError>().unwrap();
    assert!(matches!(source, SourceError::Open { .. }));
}

#[test]
fn test_not_a_capture_file() -> Result<()> {
    let file = write_capture(b"this is plain text, not a capture")?;

    let err = analyze_file(file.path(), &AnalyzerConfig::default()).unwrap_err();
    let source = err.downcast_ref::<SourceError>().unwrap();
    assert!(source.is_open_failure());
    Ok(())
}

#[test]
fn test_invalid_config_is_rejected() -> Result<()> {
    let file = write_capture(&mixed_capture().build())?;
    let config = AnalyzerConfig {
        histogram_interval_secs: 0.0,
        ..AnalyzerConfig::default()
    };

    assert!(analyze_file(file.path(), &config).is_err());
    Ok(())
}
