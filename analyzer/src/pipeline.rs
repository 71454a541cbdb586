//! Decode-and-fan-out pipeline
//!
//! Drives capture records through the decoder and hands every successfully
//! decoded packet to each registered collector, in registration order. A
//! frame that fails to decode is counted and skipped; a collector that fails
//! on a packet is counted and the remaining collectors still see it.

use crate::collector::Collector;
use crate::source::SourceError;
use pcaplens_shared::{CaptureRecord, DecodeError, Decoder};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Decode failures by kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodeFailures {
    pub truncated: u64,
    pub unsupported: u64,
}

impl DecodeFailures {
    fn record(&mut self, error: &DecodeError) {
        match error {
            DecodeError::Truncated { .. } => self.truncated += 1,
            DecodeError::UnsupportedLayer { .. } => self.unsupported += 1,
        }
    }
}

/// Counters for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Records decoded and fed to the collectors
    pub processed: u64,

    /// Records that failed to decode
    pub errors: u64,

    pub decode_failures: DecodeFailures,

    /// Failed updates per collector name
    pub collector_failures: BTreeMap<&'static str, u64>,

    /// Set when the capture stream ended on a broken record
    pub stream_error: Option<String>,
}

impl Summary {
    /// Records read from the capture, decodable or not
    pub fn records(&self) -> u64 {
        self.processed + self.errors
    }

    pub fn collector_failure_total(&self) -> u64 {
        self.collector_failures.values().sum()
    }
}

/// Owns the collector set for one run
pub struct Pipeline<'c> {
    decoder: Decoder,
    collectors: Vec<&'c mut dyn Collector>,
}

impl<'c> Pipeline<'c> {
    pub fn new(decoder: Decoder) -> Self {
        Self {
            decoder,
            collectors: Vec::new(),
        }
    }

    /// Add a collector; it is updated after all previously registered ones
    pub fn register(&mut self, collector: &'c mut dyn Collector) -> &mut Self {
        self.collectors.push(collector);
        self
    }

    pub fn collector_names(&self) -> Vec<&'static str> {
        self.collectors.iter().map(|c| c.name()).collect()
    }

    /// Scan well-formed records
    pub fn run<I>(&mut self, records: I) -> Summary
    where
        I: IntoIterator<Item = CaptureRecord>,
    {
        self.run_stream(records.into_iter().map(Ok))
    }

    /// Scan records from a capture source. A stream error stops reading; the
    /// state built up to that point is kept.
    pub fn run_stream<I>(&mut self, records: I) -> Summary
    where
        I: IntoIterator<Item = Result<CaptureRecord, SourceError>>,
    {
        let mut summary = Summary::default();
        info!(
            "Scanning capture with {} collectors ({:?} link layer)",
            self.collectors.len(),
            self.decoder.link()
        );

        for (index, record) in records.into_iter().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!("Capture stream ended early after {} records: {}", index, e);
                    summary.stream_error = Some(e.to_string());
                    break;
                }
            };
            self.process(index, &record, &mut summary);
        }

        info!(
            "Scan finished: {} processed, {} decode errors, {} collector failures",
            summary.processed,
            summary.errors,
            summary.collector_failure_total()
        );
        summary
    }

    fn process(&mut self, index: usize, record: &CaptureRecord, summary: &mut Summary) {
        let packet = match self.decoder.decode(&record.raw) {
            Ok(packet) => packet,
            Err(e) => {
                debug!("Skipping record {}: {}", index, e);
                summary.errors += 1;
                summary.decode_failures.record(&e);
                return;
            }
        };

        summary.processed += 1;
        for collector in self.collectors.iter_mut() {
            if let Err(e) = collector.update(&packet, record.len(), record.timestamp) {
                debug!("Collector {} failed on record {}: {}", collector.name(), index, e);
                *summary.collector_failures.entry(collector.name()).or_insert(0) += 1;
            }
        }
    }
}

/// Run `records` through an Ethernet decoder into `collectors`
pub fn run<I>(records: I, collectors: &mut [&mut dyn Collector]) -> Summary
where
    I: IntoIterator<Item = CaptureRecord>,
{
    let mut pipeline = Pipeline::new(Decoder::default());
    for collector in collectors.iter_mut() {
        pipeline.register(&mut **collector);
    }
    pipeline.run(records)
}
