//! Decoded packet types
//!
//! The decoder stops at the network layer. The transport payload is kept as a
//! borrowed slice of the captured frame and interpreted lazily by the
//! collectors that need it.

use crate::error::{DecodeError, Layer};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Minimum TCP header length in bytes
pub const TCP_MIN_HEADER_LEN: usize = 20;

/// IP protocol numbers the collectors dispatch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IpProtocol {
    Icmp,
    Igmp,
    Tcp,
    Udp,
    Other(u8),
}

impl IpProtocol {
    pub fn number(&self) -> u8 {
        match self {
            IpProtocol::Icmp => 1,
            IpProtocol::Igmp => 2,
            IpProtocol::Tcp => 6,
            IpProtocol::Udp => 17,
            IpProtocol::Other(n) => *n,
        }
    }
}

impl From<u8> for IpProtocol {
    fn from(value: u8) -> Self {
        match value {
            1 => IpProtocol::Icmp,
            2 => IpProtocol::Igmp,
            6 => IpProtocol::Tcp,
            17 => IpProtocol::Udp,
            other => IpProtocol::Other(other),
        }
    }
}

/// An IPv4 datagram borrowed from a captured frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4Packet<'a> {
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,

    /// Raw protocol number from the IP header
    pub protocol_id: u8,

    /// Fragment offset in 8-byte units
    pub fragment_offset: u16,

    /// Bytes following the IP header, bounded by the header's total length
    pub transport_payload: &'a [u8],
}

impl<'a> Ipv4Packet<'a> {
    pub fn protocol(&self) -> IpProtocol {
        IpProtocol::from(self.protocol_id)
    }

    /// Non-first fragments carry no transport header
    pub fn is_fragment(&self) -> bool {
        self.fragment_offset != 0
    }

    /// Application bytes of a TCP segment.
    ///
    /// Only meaningful when `protocol()` is TCP; the caller checks that.
    pub fn tcp_payload(&self) -> Result<&'a [u8], DecodeError> {
        let segment = self.transport_payload;
        if segment.len() < TCP_MIN_HEADER_LEN {
            return Err(DecodeError::truncated(
                Layer::Transport,
                TCP_MIN_HEADER_LEN,
                segment.len(),
            ));
        }

        let data_offset = ((segment[12] >> 4) as usize) * 4;
        if data_offset < TCP_MIN_HEADER_LEN {
            return Err(DecodeError::truncated(
                Layer::Transport,
                TCP_MIN_HEADER_LEN,
                data_offset,
            ));
        }
        if segment.len() < data_offset {
            return Err(DecodeError::truncated(
                Layer::Transport,
                data_offset,
                segment.len(),
            ));
        }

        Ok(&segment[data_offset..])
    }
}

/// Result of decoding one frame, tagged by network-layer protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedPacket<'a> {
    Ipv4(Ipv4Packet<'a>),
    Unknown,
}

impl<'a> DecodedPacket<'a> {
    pub fn ipv4(&self) -> Option<&Ipv4Packet<'a>> {
        match self {
            DecodedPacket::Ipv4(ip) => Some(ip),
            DecodedPacket::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip_with_segment(segment: &[u8]) -> Ipv4Packet<'_> {
        Ipv4Packet {
            source: Ipv4Addr::new(10, 0, 0, 1),
            destination: Ipv4Addr::new(10, 0, 0, 2),
            protocol_id: 6,
            fragment_offset: 0,
            transport_payload: segment,
        }
    }

    #[test]
    fn test_protocol_numbers() {
        assert_eq!(IpProtocol::from(6), IpProtocol::Tcp);
        assert_eq!(IpProtocol::from(17), IpProtocol::Udp);
        assert_eq!(IpProtocol::from(2), IpProtocol::Igmp);
        assert_eq!(IpProtocol::from(89), IpProtocol::Other(89));
        assert_eq!(IpProtocol::Other(89).number(), 89);
    }

    #[test]
    fn test_tcp_payload_skips_options() {
        // data offset 6 words = 24 bytes (4 bytes of options)
        let mut segment = vec![0u8; 24];
        segment[12] = 6 << 4;
        segment.extend_from_slice(b"hello");

        let ip = ip_with_segment(&segment);
        assert_eq!(ip.tcp_payload().unwrap(), b"hello");
    }

    #[test]
    fn test_tcp_payload_truncated() {
        let short = [0u8; 10];
        let ip = ip_with_segment(&short);
        assert!(matches!(
            ip.tcp_payload(),
            Err(DecodeError::Truncated { layer: Layer::Transport, needed: 20, available: 10 })
        ));

        // header claims 60 bytes but only 20 are present
        let mut segment = vec![0u8; 20];
        segment[12] = 15 << 4;
        let ip = ip_with_segment(&segment);
        assert!(matches!(
            ip.tcp_payload(),
            Err(DecodeError::Truncated { needed: 60, available: 20, .. })
        ));
    }

    #[test]
    fn test_unknown_has_no_ipv4() {
        assert!(DecodedPacket::Unknown.ipv4().is_none());
    }
}
