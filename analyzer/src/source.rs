//! Capture file source
//!
//! Reads a legacy pcap container: one global header followed by
//! `{ts_sec, ts_frac, caplen, origlen}` record headers, each followed by
//! `caplen` bytes of frame data. Both byte orders and both timestamp
//! resolutions (microsecond and nanosecond magic) are accepted.

use pcap_parser::{parse_pcap_frame, parse_pcap_frame_be, parse_pcap_header, LegacyPcapBlock};
use pcaplens_shared::{ByteOrder, CaptureInfo, CaptureRecord, LinkType, Timestamp};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Size of the legacy pcap global header
const GLOBAL_HEADER_LEN: usize = 24;

#[derive(Debug, Error)]
pub enum SourceError {
    /// The capture file could not be read
    #[error("failed to open capture {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes do not start with a usable pcap global header
    #[error("invalid capture header: {0}")]
    Header(String),

    /// A record header or body does not fit in the remaining bytes
    #[error("capture stream broken at byte {offset} ({remaining} bytes left): {reason}")]
    Stream {
        offset: usize,
        remaining: usize,
        reason: String,
    },
}

impl SourceError {
    /// Failures that happen before any record is read
    pub fn is_open_failure(&self) -> bool {
        matches!(self, SourceError::Open { .. } | SourceError::Header(_))
    }
}

/// An opened capture, held in memory
pub struct PcapSource {
    data: Vec<u8>,
    info: CaptureInfo,
    body_offset: usize,
}

impl PcapSource {
    /// Read a capture file and validate its global header
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let source = Self::from_bytes(data)?;
        info!(
            "Opened capture {} (pcap {}.{}, linktype {}, {} bytes)",
            path.display(),
            source.info.version_major,
            source.info.version_minor,
            source.info.linktype.id(),
            source.data.len()
        );
        Ok(source)
    }

    /// Use an in-memory capture
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, SourceError> {
        let header = match parse_pcap_header(&data) {
            Ok((_, header)) => header,
            Err(e) => return Err(SourceError::Header(format!("{:?}", e))),
        };

        let info = CaptureInfo {
            version_major: header.version_major,
            version_minor: header.version_minor,
            snaplen: header.snaplen,
            linktype: LinkType::from_linktype(header.network.0 as u32),
            byte_order: if header.is_bigendian() {
                ByteOrder::BigEndian
            } else {
                ByteOrder::LittleEndian
            },
            nanosecond: header.is_nanosecond_precision(),
        };

        Ok(Self {
            data,
            info,
            body_offset: GLOBAL_HEADER_LEN,
        })
    }

    pub fn info(&self) -> &CaptureInfo {
        &self.info
    }

    /// Total size of the capture in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.len() <= self.body_offset
    }

    /// Iterate the records in capture order
    pub fn records(&self) -> Records<'_> {
        Records {
            rest: &self.data[self.body_offset..],
            offset: self.body_offset,
            byte_order: self.info.byte_order,
            nanosecond: self.info.nanosecond,
            done: false,
        }
    }
}

/// Record iterator over a [`PcapSource`].
///
/// Yields a [`SourceError::Stream`] at most once and then stops.
pub struct Records<'a> {
    rest: &'a [u8],
    offset: usize,
    byte_order: ByteOrder,
    nanosecond: bool,
    done: bool,
}

impl Records<'_> {
    fn timestamp(&self, block: &LegacyPcapBlock<'_>) -> Timestamp {
        let divisor = if self.nanosecond { 1e9 } else { 1e6 };
        block.ts_sec as f64 + block.ts_usec as f64 / divisor
    }
}

impl Iterator for Records<'_> {
    type Item = Result<CaptureRecord, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.rest.is_empty() {
            return None;
        }

        let parsed = match self.byte_order {
            ByteOrder::LittleEndian => parse_pcap_frame(self.rest),
            ByteOrder::BigEndian => parse_pcap_frame_be(self.rest),
        };

        match parsed {
            Ok((rest, block)) => {
                let record = CaptureRecord {
                    timestamp: self.timestamp(&block),
                    original_length: block.origlen,
                    raw: block.data.to_vec(),
                };
                self.offset += self.rest.len() - rest.len();
                self.rest = rest;
                Some(Ok(record))
            }
            Err(e) => {
                self.done = true;
                debug!("Record parse failed at byte {}: {:?}", self.offset, e);
                Some(Err(SourceError::Stream {
                    offset: self.offset,
                    remaining: self.rest.len(),
                    reason: format!("{:?}", e),
                }))
            }
        }
    }
}
