//! Weighted directed flow graph
//!
//! Accumulates one edge per (source, destination) pair. Layout, cycle
//! detection and path queries belong to whoever renders the graph.

use super::{Collector, CollectorError};
use pcaplens_shared::{DecodedPacket, FlowEdge, Timestamp};
use std::collections::HashMap;
use std::net::Ipv4Addr;

/// Packet counts per directed address pair
#[derive(Debug, Default)]
pub struct FlowGraph {
    index: HashMap<(Ipv4Addr, Ipv4Addr), usize>,
    edges: Vec<FlowEdge>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// All edges in first-seen order
    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    pub fn count(&self, source: Ipv4Addr, destination: Ipv4Addr) -> Option<u32> {
        self.index
            .get(&(source, destination))
            .map(|&i| self.edges[i].count)
    }

    /// Edges grouped by source: `source -> [(destination, count)]`
    pub fn adjacency(&self) -> Vec<(String, Vec<(String, u32)>)> {
        let mut groups: Vec<(String, Vec<(String, u32)>)> = Vec::new();
        let mut by_source: HashMap<&str, usize> = HashMap::new();

        for edge in &self.edges {
            let slot = *by_source.entry(edge.source.as_str()).or_insert_with(|| {
                groups.push((edge.source.clone(), Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push((edge.destination.clone(), edge.count));
        }

        groups
    }
}

impl Collector for FlowGraph {
    fn name(&self) -> &'static str {
        "flow_graph"
    }

    fn update(
        &mut self,
        packet: &DecodedPacket<'_>,
        _raw_len: usize,
        _ts: Timestamp,
    ) -> Result<(), CollectorError> {
        let Some(ip) = packet.ipv4() else {
            return Ok(());
        };

        match self.index.get(&(ip.source, ip.destination)) {
            Some(&i) => {
                let edge = &mut self.edges[i];
                edge.count = edge.count.saturating_add(1);
            }
            None => {
                self.index
                    .insert((ip.source, ip.destination), self.edges.len());
                self.edges.push(FlowEdge {
                    source: ip.source.to_string(),
                    destination: ip.destination.to_string(),
                    count: 1,
                });
            }
        }
        Ok(())
    }
}
