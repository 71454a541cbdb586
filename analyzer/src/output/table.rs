//! Plain-text tables
//!
//! Renders every view of an [`AnalysisReport`] as fixed-width text tables.

use crate::analysis::AnalysisReport;
use anyhow::Result;
use pcaplens_shared::utils::time::format_datetime;
use std::io::Write;

/// Write every section in display order
pub fn write_report<W: Write>(report: &AnalysisReport, writer: &mut W) -> Result<()> {
    write_scan_summary(report, writer)?;
    write_images(report, writer)?;
    write_mail(report, writer)?;
    write_protocols(report, writer)?;
    write_traffic(report, writer)?;
    write_connections(report, writer)?;
    write_histogram(report, writer)?;
    Ok(())
}

/// Render the whole report into a string
pub fn render(report: &AnalysisReport) -> Result<String> {
    let mut buf = Vec::new();
    write_report(report, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn heading<W: Write>(writer: &mut W, title: &str) -> Result<()> {
    writeln!(writer, "\n{}", title)?;
    writeln!(writer, "{:=<width$}", "", width = title.len())?;
    Ok(())
}

pub fn write_scan_summary<W: Write>(report: &AnalysisReport, writer: &mut W) -> Result<()> {
    let summary = &report.summary;
    heading(writer, "Capture")?;
    if let Some(info) = &report.capture {
        writeln!(
            writer,
            "Format:        pcap {}.{} ({:?}, linktype {}{})",
            info.version_major,
            info.version_minor,
            info.byte_order,
            info.linktype.id(),
            if info.nanosecond { ", ns timestamps" } else { "" }
        )?;
    }
    writeln!(writer, "Records:       {}", summary.records())?;
    writeln!(writer, "Processed:     {}", summary.processed)?;
    writeln!(
        writer,
        "Decode errors: {} (truncated {}, unsupported {})",
        summary.errors, summary.decode_failures.truncated, summary.decode_failures.unsupported
    )?;
    for (name, count) in &summary.collector_failures {
        writeln!(writer, "Failures in {}: {}", name, count)?;
    }
    if let Some(e) = &summary.stream_error {
        writeln!(writer, "Stream error:  {}", e)?;
    }
    Ok(())
}

pub fn write_images<W: Write>(report: &AnalysisReport, writer: &mut W) -> Result<()> {
    heading(writer, "Images")?;
    writeln!(
        writer,
        "{:<16} {:<16} {:<5} {:<30} URI",
        "From", "To", "Type", "Name"
    )?;
    writeln!(writer, "{:-<100}", "")?;
    for row in &report.images.rows {
        writeln!(
            writer,
            "{:<16} {:<16} {:<5} {:<30} {}",
            row.source,
            row.destination,
            row.kind.label(),
            row.filename,
            row.uri
        )?;
    }

    let counts = &report.images.counts;
    writeln!(writer, "\n{:<12} {:>8}", "Image Type", "Total")?;
    writeln!(writer, "{:-<21}", "")?;
    for (label, total) in [("JPG", counts.jpg), ("GIF", counts.gif), ("PNG", counts.png)] {
        writeln!(writer, "{:<12} {:>8}", label, total)?;
    }
    Ok(())
}

pub fn write_mail<W: Write>(report: &AnalysisReport, writer: &mut W) -> Result<()> {
    heading(writer, "Mail Addresses")?;
    if report.mail_addresses.is_empty() {
        writeln!(writer, "No addresses found.")?;
    }
    for address in &report.mail_addresses {
        writeln!(writer, "{}", address)?;
    }
    Ok(())
}

pub fn write_protocols<W: Write>(report: &AnalysisReport, writer: &mut W) -> Result<()> {
    heading(writer, "Protocols")?;
    writeln!(
        writer,
        "{:<6} {:>10} {:>12} {:>10} {:<27} {:<27}",
        "Proto", "Packets", "Bytes", "Mean Len", "First Seen", "Last Seen"
    )?;
    writeln!(writer, "{:-<97}", "")?;
    for row in &report.protocols.rows {
        writeln!(
            writer,
            "{:<6} {:>10} {:>12} {:>10} {:<27} {:<27}",
            row.protocol,
            row.packet_count,
            row.total_bytes,
            row.rounded_mean(),
            row.first_seen.map(format_datetime).unwrap_or_else(|| "-".to_string()),
            row.last_seen.map(format_datetime).unwrap_or_else(|| "-".to_string())
        )?;
    }
    writeln!(writer, "Unrecognized: {}", report.protocols.unrecognized)?;
    Ok(())
}

pub fn write_traffic<W: Write>(report: &AnalysisReport, writer: &mut W) -> Result<()> {
    heading(writer, "Traffic")?;
    writeln!(
        writer,
        "{:<16} {:>10} {:>10} {:>10}",
        "Address", "Sent", "Received", "Total"
    )?;
    writeln!(writer, "{:-<49}", "")?;
    for row in &report.traffic {
        writeln!(
            writer,
            "{:<16} {:>10} {:>10} {:>10}",
            row.address,
            row.sent,
            row.received,
            row.total()
        )?;
    }
    Ok(())
}

pub fn write_connections<W: Write>(report: &AnalysisReport, writer: &mut W) -> Result<()> {
    heading(writer, "Connections")?;
    writeln!(writer, "{:<16} {:<16} {:>10}", "Source", "Destination", "Packets")?;
    writeln!(writer, "{:-<44}", "")?;
    for edge in &report.flows {
        writeln!(
            writer,
            "{:<16} {:<16} {:>10}",
            edge.source, edge.destination, edge.count
        )?;
    }
    Ok(())
}

pub fn write_histogram<W: Write>(report: &AnalysisReport, writer: &mut W) -> Result<()> {
    let histogram = &report.histogram;
    heading(writer, "Traffic Over Time")?;
    writeln!(writer, "Interval: {}s", histogram.interval_secs)?;

    if histogram.buckets.is_empty() {
        writeln!(writer, "\nNo packets recorded.")?;
        return Ok(());
    }

    let peak = histogram.buckets.iter().map(|b| b.count).max().unwrap_or(1).max(1);
    writeln!(writer, "\n{:<10} {:>10}  ", "Start", "Packets")?;
    writeln!(writer, "{:-<72}", "")?;
    for bucket in &histogram.buckets {
        let bar = "#".repeat(((bucket.count * 50) / peak) as usize);
        let flag = match histogram.threshold {
            Some(t) if bucket.count as f64 > t => " !",
            _ => "",
        };
        writeln!(
            writer,
            "{:<10} {:>10}  {}{}",
            bucket.label, bucket.count, bar, flag
        )?;
    }

    match histogram.threshold {
        Some(t) => writeln!(writer, "\nThreshold: {:.2}", t)?,
        None => writeln!(writer, "\nThreshold: undefined (fewer than two intervals)")?,
    }
    Ok(())
}
