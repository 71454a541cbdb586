//! Source/destination traffic matrix

use super::{Collector, CollectorError};
use pcaplens_shared::{DecodedPacket, Timestamp, TrafficRow};
use std::collections::HashMap;

/// Packets sent and received per address
#[derive(Debug, Default)]
pub struct TrafficMatrix {
    /// Address -> position in `rows`
    index: HashMap<String, usize>,

    /// One row per address, in first-seen order
    rows: Vec<TrafficRow>,
}

impl TrafficMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, address: String) -> &mut TrafficRow {
        let slot = match self.index.get(&address) {
            Some(&slot) => slot,
            None => {
                let slot = self.rows.len();
                self.index.insert(address.clone(), slot);
                self.rows.push(TrafficRow {
                    address,
                    sent: 0,
                    received: 0,
                });
                slot
            }
        };
        &mut self.rows[slot]
    }

    pub fn get(&self, address: &str) -> Option<&TrafficRow> {
        self.index.get(address).map(|&i| &self.rows[i])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every distinct address, in the order it first appeared
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.address.as_str())
    }

    /// Rows by descending `sent + received`; ties keep first-seen order
    pub fn ranked(&self) -> Vec<TrafficRow> {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| b.total().cmp(&a.total()));
        rows
    }
}

impl Collector for TrafficMatrix {
    fn name(&self) -> &'static str {
        "traffic_matrix"
    }

    fn update(
        &mut self,
        packet: &DecodedPacket<'_>,
        _raw_len: usize,
        _ts: Timestamp,
    ) -> Result<(), CollectorError> {
        if let Some(ip) = packet.ipv4() {
            let source = self.entry(ip.source.to_string());
            source.sent = source.sent.saturating_add(1);

            let destination = self.entry(ip.destination.to_string());
            destination.received = destination.received.saturating_add(1);
        }
        Ok(())
    }
}
