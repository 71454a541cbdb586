//! The full collector set and the report it produces

use crate::collector::image::ImageCounts;
use crate::collector::{
    FlowGraph, ImageUriExtractor, MailAddressExtractor, ProtocolStats, TimeHistogram,
    TrafficMatrix,
};
use crate::config::AnalyzerConfig;
use crate::pipeline::{Pipeline, Summary};
use crate::source::SourceError;
use anyhow::Context;
use pcaplens_shared::{
    CaptureInfo, CaptureRecord, Decoder, FlowEdge, HistogramBucket, ImageRow, ProtocolSummary,
    TrafficRow,
};
use serde::Serialize;

/// Per-protocol rows plus packets outside TCP/UDP/IGMP
#[derive(Debug, Clone, Serialize)]
pub struct ProtocolReport {
    pub rows: Vec<ProtocolSummary>,
    pub unrecognized: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistogramReport {
    pub interval_secs: f64,
    pub buckets: Vec<HistogramBucket>,

    /// `None` when fewer than two buckets exist
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageReport {
    pub rows: Vec<ImageRow>,
    pub uris: Vec<String>,
    pub counts: ImageCounts,
}

/// Every view of one capture, ready for rendering or export
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Container properties, absent for in-memory record streams
    pub capture: Option<CaptureInfo>,
    pub summary: Summary,
    pub protocols: ProtocolReport,

    /// Ranked by packets sent plus received
    pub traffic: Vec<TrafficRow>,
    pub flows: Vec<FlowEdge>,
    pub histogram: HistogramReport,
    pub mail_addresses: Vec<String>,
    pub images: ImageReport,
}

/// The six collectors for one run
#[derive(Debug)]
pub struct Analysis {
    pub protocols: ProtocolStats,
    pub traffic: TrafficMatrix,
    pub flows: FlowGraph,
    pub histogram: TimeHistogram,
    pub mail: MailAddressExtractor,
    pub images: ImageUriExtractor,
}

impl Analysis {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            protocols: ProtocolStats::new(),
            traffic: TrafficMatrix::new(),
            flows: FlowGraph::new(),
            histogram: TimeHistogram::new(config.histogram_interval_secs, config.threshold_sigma),
            mail: MailAddressExtractor::new(),
            images: ImageUriExtractor::new(config.uri_display_max),
        }
    }

    /// Feed a record stream through every collector
    pub fn scan<I>(&mut self, decoder: Decoder, records: I) -> Summary
    where
        I: IntoIterator<Item = Result<CaptureRecord, SourceError>>,
    {
        let mut pipeline = Pipeline::new(decoder);
        pipeline
            .register(&mut self.protocols)
            .register(&mut self.traffic)
            .register(&mut self.flows)
            .register(&mut self.histogram)
            .register(&mut self.mail)
            .register(&mut self.images);
        pipeline.run_stream(records)
    }

    /// Finalize the histogram and pull every view
    pub fn finish(
        mut self,
        capture: Option<CaptureInfo>,
        summary: Summary,
    ) -> anyhow::Result<AnalysisReport> {
        let buckets = self
            .histogram
            .finalize()
            .context("Failed to finalize histogram")?
            .to_vec();

        Ok(AnalysisReport {
            capture,
            summary,
            protocols: ProtocolReport {
                rows: self.protocols.summary(),
                unrecognized: self.protocols.unrecognized(),
            },
            traffic: self.traffic.ranked(),
            flows: self.flows.edges().to_vec(),
            histogram: HistogramReport {
                interval_secs: self.histogram.interval_secs(),
                buckets,
                threshold: self.histogram.threshold(),
            },
            mail_addresses: self.mail.addresses().as_slice().to_vec(),
            images: ImageReport {
                rows: self.images.rows().to_vec(),
                uris: self.images.uris().as_slice().to_vec(),
                counts: self.images.counts(),
            },
        })
    }
}
