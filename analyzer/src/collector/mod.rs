//! Packet collectors
//!
//! Each collector consumes decoded packets and maintains one analytical view
//! of the capture. Collectors are independent: none reads another's state,
//! and a failure inside one never reaches the others.

pub mod artifact;
pub mod flow;
pub mod histogram;
pub mod image;
pub mod mail;
pub mod protocol;
pub mod traffic;

pub use artifact::ArtifactSet;
pub use flow::FlowGraph;
pub use histogram::TimeHistogram;
pub use image::ImageUriExtractor;
pub use mail::MailAddressExtractor;
pub use protocol::ProtocolStats;
pub use traffic::TrafficMatrix;

use pcaplens_shared::{DecodeError, DecodedPacket, Timestamp};
use thiserror::Error;

/// Failure inside a single collector update.
///
/// The pipeline counts these per collector and keeps going.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// The transport header needed to reach the payload was malformed
    #[error("payload decode failed: {0}")]
    Payload(#[from] DecodeError),

    /// Update arrived after the collector stopped accepting data
    #[error("collector already finalized")]
    Finalized,
}

/// A stateful aggregator fed once per successfully decoded record
pub trait Collector {
    /// Short name used in logs and failure counters
    fn name(&self) -> &'static str;

    /// Fold one decoded packet into the collector's state
    fn update(
        &mut self,
        packet: &DecodedPacket<'_>,
        raw_len: usize,
        ts: Timestamp,
    ) -> Result<(), CollectorError>;
}
