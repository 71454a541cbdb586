//! Result rows produced by the collectors
//!
//! These are the plain structures external consumers (renderers, exporters)
//! read once a scan has finished.

use crate::types::capture::Timestamp;
use serde::{Deserialize, Serialize};

/// Per-protocol packet statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolSummary {
    /// Protocol name (TCP, UDP, IGMP)
    pub protocol: String,

    pub packet_count: u64,

    /// Sum of captured frame lengths
    pub total_bytes: u64,

    /// `total_bytes / packet_count`, or 0 when no packets were seen
    pub mean_length: f64,

    /// Earliest timestamp, `None` until a packet is observed
    pub first_seen: Option<Timestamp>,

    /// Latest timestamp, `None` until a packet is observed
    pub last_seen: Option<Timestamp>,
}

impl ProtocolSummary {
    /// Mean length rounded to whole bytes, as shown in tables
    pub fn rounded_mean(&self) -> u64 {
        self.mean_length.round() as u64
    }
}

/// One address in the traffic matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficRow {
    pub address: String,
    pub sent: u32,
    pub received: u32,
}

impl TrafficRow {
    pub fn total(&self) -> u64 {
        self.sent as u64 + self.received as u64
    }
}

/// A directed (source, destination) pair and how many packets crossed it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub source: String,
    pub destination: String,
    pub count: u32,
}

/// One fixed-width interval of the volume histogram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramBucket {
    /// Interval number counted from the earliest timestamp
    pub index: u64,

    /// Wall-clock start of the interval (`HH:MM:SS`, UTC)
    pub label: String,

    /// Timestamps that fell into the interval
    pub count: u64,
}

/// Image types recognised in request URIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Gif,
    Jpg,
    Png,
}

impl ImageKind {
    pub fn label(&self) -> &'static str {
        match self {
            ImageKind::Gif => "gif",
            ImageKind::Jpg => "jpg",
            ImageKind::Png => "png",
        }
    }
}

/// An image fetched over HTTP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRow {
    pub source: String,
    pub destination: String,
    pub kind: ImageKind,
    pub filename: String,

    /// `http://` + host + path, cut to the display width
    pub uri: String,
}
