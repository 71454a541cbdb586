//! Per-protocol packet statistics
//!
//! Counts packets and bytes for TCP, UDP and IGMP and tracks the first and
//! last time each protocol was seen.

use super::{Collector, CollectorError};
use pcaplens_shared::utils::stats;
use pcaplens_shared::{ComputeUndefined, DecodedPacket, IpProtocol, ProtocolSummary, Timestamp};
use serde::Serialize;
use tracing::info;

/// Running totals for one protocol
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProtocolAggregate {
    pub packet_count: u64,
    pub total_bytes: u64,

    /// `None` until the first packet; zero is a real epoch timestamp
    pub min_ts: Option<Timestamp>,
    pub max_ts: Option<Timestamp>,
}

impl ProtocolAggregate {
    fn record(&mut self, raw_len: usize, ts: Timestamp) {
        self.packet_count += 1;
        self.total_bytes += raw_len as u64;
        self.min_ts = Some(self.min_ts.map_or(ts, |min| min.min(ts)));
        self.max_ts = Some(self.max_ts.map_or(ts, |max| max.max(ts)));
    }

    pub fn mean_length(&self) -> Result<f64, ComputeUndefined> {
        stats::ratio(self.total_bytes, self.packet_count)
    }

    fn summary(&self, protocol: &str) -> ProtocolSummary {
        ProtocolSummary {
            protocol: protocol.to_string(),
            packet_count: self.packet_count,
            total_bytes: self.total_bytes,
            // no packets means a mean of 0, not an error
            mean_length: self.mean_length().unwrap_or(0.0),
            first_seen: self.min_ts,
            last_seen: self.max_ts,
        }
    }
}

/// Packet statistics by transport protocol
#[derive(Debug, Default)]
pub struct ProtocolStats {
    tcp: ProtocolAggregate,
    udp: ProtocolAggregate,
    igmp: ProtocolAggregate,

    /// Packets whose protocol is none of the above
    unrecognized: u64,
}

impl ProtocolStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tcp(&self) -> &ProtocolAggregate {
        &self.tcp
    }

    pub fn udp(&self) -> &ProtocolAggregate {
        &self.udp
    }

    pub fn igmp(&self) -> &ProtocolAggregate {
        &self.igmp
    }

    pub fn unrecognized(&self) -> u64 {
        self.unrecognized
    }

    /// Every packet seen, recognised or not
    pub fn total(&self) -> u64 {
        self.tcp.packet_count + self.udp.packet_count + self.igmp.packet_count + self.unrecognized
    }

    /// One row per protocol in TCP, UDP, IGMP order
    pub fn summary(&self) -> Vec<ProtocolSummary> {
        let rows = vec![
            self.tcp.summary("TCP"),
            self.udp.summary("UDP"),
            self.igmp.summary("IGMP"),
        ];
        info!(
            "Protocol summary: tcp={} udp={} igmp={} unrecognized={}",
            self.tcp.packet_count, self.udp.packet_count, self.igmp.packet_count, self.unrecognized
        );
        rows
    }
}

impl Collector for ProtocolStats {
    fn name(&self) -> &'static str {
        "protocol_stats"
    }

    fn update(
        &mut self,
        packet: &DecodedPacket<'_>,
        raw_len: usize,
        ts: Timestamp,
    ) -> Result<(), CollectorError> {
        let aggregate = match packet.ipv4().map(|ip| ip.protocol()) {
            Some(IpProtocol::Tcp) => &mut self.tcp,
            Some(IpProtocol::Udp) => &mut self.udp,
            Some(IpProtocol::Igmp) => &mut self.igmp,
            _ => {
                self.unrecognized += 1;
                return Ok(());
            }
        };
        aggregate.record(raw_len, ts);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::testing::ipv4;

    const A: [u8; 4] = [10, 0, 0, 1];
    const B: [u8; 4] = [10, 0, 0, 2];

    #[test]
    fn test_counts_and_bytes() {
        let mut stats = ProtocolStats::new();
        let tcp = ipv4(A, B, 6, &[]);
        let udp = ipv4(A, B, 17, &[]);

        stats.update(&tcp, 100, 10.0).unwrap();
        stats.update(&tcp, 60, 12.0).unwrap();
        stats.update(&udp, 80, 11.0).unwrap();

        assert_eq!(stats.tcp().packet_count, 2);
        assert_eq!(stats.tcp().total_bytes, 160);
        assert_eq!(stats.udp().packet_count, 1);
        assert_eq!(stats.igmp().packet_count, 0);
        assert_eq!(stats.total(), 3);
    }

    #[test]
    fn test_min_max_timestamps_out_of_order() {
        let mut stats = ProtocolStats::new();
        let igmp = ipv4(A, B, 2, &[]);

        for ts in [50.0, 20.0, 70.0, 30.0] {
            stats.update(&igmp, 46, ts).unwrap();
        }

        assert_eq!(stats.igmp().min_ts, Some(20.0));
        assert_eq!(stats.igmp().max_ts, Some(70.0));
    }

    #[test]
    fn test_zero_timestamp_is_kept() {
        let mut stats = ProtocolStats::new();
        let tcp = ipv4(A, B, 6, &[]);

        stats.update(&tcp, 60, 5.0).unwrap();
        stats.update(&tcp, 60, 0.0).unwrap();

        assert_eq!(stats.tcp().min_ts, Some(0.0));
        assert_eq!(stats.tcp().max_ts, Some(5.0));
    }

    #[test]
    fn test_unseen_protocol_has_no_timestamps() {
        let stats = ProtocolStats::new();
        assert_eq!(stats.udp().min_ts, None);
        assert_eq!(stats.udp().max_ts, None);
    }

    #[test]
    fn test_unrecognized_protocols() {
        let mut stats = ProtocolStats::new();
        stats.update(&ipv4(A, B, 1, &[]), 98, 1.0).unwrap();
        stats.update(&ipv4(A, B, 89, &[]), 98, 1.0).unwrap();
        stats.update(&DecodedPacket::Unknown, 60, 1.0).unwrap();

        assert_eq!(stats.unrecognized(), 3);
        assert_eq!(stats.total(), 3);
        assert_eq!(stats.tcp().packet_count, 0);
    }

    #[test]
    fn test_mean_length_of_empty_protocol_is_zero() {
        let mut stats = ProtocolStats::new();
        stats.update(&ipv4(A, B, 6, &[]), 100, 1.0).unwrap();
        stats.update(&ipv4(A, B, 6, &[]), 51, 2.0).unwrap();

        assert!(stats.udp().mean_length().is_err());

        let summary = stats.summary();
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].protocol, "TCP");
        assert_eq!(summary[0].mean_length, 75.5);
        assert_eq!(summary[0].rounded_mean(), 76);
        assert_eq!(summary[1].protocol, "UDP");
        assert_eq!(summary[1].mean_length, 0.0);
        assert_eq!(summary[1].first_seen, None);
        assert_eq!(summary[2].mean_length, 0.0);
    }
}
