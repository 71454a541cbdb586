//! Capture container types
//!
//! These types describe what the capture source hands to the pipeline: the
//! container's global properties and one timestamped raw frame per record.

use serde::{Deserialize, Serialize};

/// Seconds since the UNIX epoch, with sub-second precision
pub type Timestamp = f64;

/// Link-layer framing of every record in a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkType {
    /// Ethernet II (DLT_EN10MB)
    Ethernet,
    /// Bare IPv4 datagrams with no link header (DLT_RAW / DLT_IPV4)
    RawIpv4,
    /// Anything else, by numeric linktype
    Other(u32),
}

impl LinkType {
    pub const ETHERNET: u32 = 1;
    pub const RAW: u32 = 101;
    pub const IPV4: u32 = 228;

    /// Map a pcap linktype number to the framing the decoder understands
    pub fn from_linktype(id: u32) -> Self {
        match id {
            Self::ETHERNET => LinkType::Ethernet,
            Self::RAW | Self::IPV4 => LinkType::RawIpv4,
            other => LinkType::Other(other),
        }
    }

    /// Numeric linktype as written in the capture header
    pub fn id(&self) -> u32 {
        match self {
            LinkType::Ethernet => Self::ETHERNET,
            LinkType::RawIpv4 => Self::RAW,
            LinkType::Other(id) => *id,
        }
    }
}

/// Byte order of the capture container's header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

/// Global properties read from the container header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureInfo {
    pub version_major: u16,
    pub version_minor: u16,
    pub snaplen: u32,
    pub linktype: LinkType,
    pub byte_order: ByteOrder,
    /// Record timestamps carry nanoseconds instead of microseconds
    pub nanosecond: bool,
}

/// One timestamped raw frame from the capture
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRecord {
    /// Capture time of the frame
    pub timestamp: Timestamp,

    /// Length of the frame on the wire (may exceed `raw.len()`)
    pub original_length: u32,

    /// Captured frame bytes
    pub raw: Vec<u8>,
}

impl CaptureRecord {
    /// Record whose original length equals its captured length
    pub fn new(timestamp: Timestamp, raw: Vec<u8>) -> Self {
        Self {
            timestamp,
            original_length: raw.len() as u32,
            raw,
        }
    }

    /// Captured length, the figure the collectors account bytes with
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Check if the frame was cut short by the snapshot length
    pub fn is_truncated(&self) -> bool {
        (self.raw.len() as u64) < self.original_length as u64
    }
}
