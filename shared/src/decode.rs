//! Frame decoder
//!
//! Strips the link-layer header and parses the IPv4 header of a captured
//! frame. Decoding is a pure function of the frame bytes: no I/O, no shared
//! state, and the only allocation-free output is a view into the input.

use crate::error::{DecodeError, Layer};
use crate::types::capture::LinkType;
use crate::types::packet::{DecodedPacket, Ipv4Packet};
use std::net::Ipv4Addr;

/// Ethernet II header: two MAC addresses and an ethertype
pub const ETHERNET_HEADER_LEN: usize = 14;

/// IPv4 header without options
pub const IPV4_MIN_HEADER_LEN: usize = 20;

const VLAN_TAG_LEN: usize = 4;
const MAX_VLAN_TAGS: usize = 2;

const ETHERTYPE_IPV4: u16 = 0x0800;
const ETHERTYPE_VLAN: u16 = 0x8100;
const ETHERTYPE_QINQ: u16 = 0x88a8;

/// Decodes frames of one link type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoder {
    link: LinkType,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(LinkType::Ethernet)
    }
}

impl Decoder {
    pub fn new(link: LinkType) -> Self {
        Self { link }
    }

    pub fn link(&self) -> LinkType {
        self.link
    }

    /// Decode one captured frame down to the network layer
    pub fn decode<'a>(&self, raw: &'a [u8]) -> Result<DecodedPacket<'a>, DecodeError> {
        match self.link {
            LinkType::Ethernet => {
                let network = strip_ethernet(raw)?;
                parse_ipv4(network).map(DecodedPacket::Ipv4)
            }
            LinkType::RawIpv4 => parse_ipv4(raw).map(DecodedPacket::Ipv4),
            LinkType::Other(id) => Err(DecodeError::UnsupportedLayer {
                layer: Layer::Link,
                id,
            }),
        }
    }
}

/// Decode an Ethernet frame
pub fn decode(raw: &[u8]) -> Result<DecodedPacket<'_>, DecodeError> {
    Decoder::default().decode(raw)
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([bytes[at], bytes[at + 1]])
}

/// Return the network-layer bytes of an IPv4-carrying Ethernet frame
fn strip_ethernet(raw: &[u8]) -> Result<&[u8], DecodeError> {
    if raw.len() < ETHERNET_HEADER_LEN {
        return Err(DecodeError::truncated(
            Layer::Link,
            ETHERNET_HEADER_LEN,
            raw.len(),
        ));
    }

    let mut ethertype = read_u16(raw, 12);
    let mut offset = ETHERNET_HEADER_LEN;

    // 802.1Q / 802.1ad tags sit between the MAC addresses and the real ethertype
    for _ in 0..MAX_VLAN_TAGS {
        if ethertype != ETHERTYPE_VLAN && ethertype != ETHERTYPE_QINQ {
            break;
        }
        if raw.len() < offset + VLAN_TAG_LEN {
            return Err(DecodeError::truncated(
                Layer::Link,
                offset + VLAN_TAG_LEN,
                raw.len(),
            ));
        }
        ethertype = read_u16(raw, offset + 2);
        offset += VLAN_TAG_LEN;
    }

    if ethertype != ETHERTYPE_IPV4 {
        return Err(DecodeError::UnsupportedLayer {
            layer: Layer::Network,
            id: ethertype as u32,
        });
    }

    Ok(&raw[offset..])
}

/// Parse an IPv4 header and bound the transport payload by its total length
fn parse_ipv4(bytes: &[u8]) -> Result<Ipv4Packet<'_>, DecodeError> {
    if bytes.len() < IPV4_MIN_HEADER_LEN {
        return Err(DecodeError::truncated(
            Layer::Network,
            IPV4_MIN_HEADER_LEN,
            bytes.len(),
        ));
    }

    let version = bytes[0] >> 4;
    if version != 4 {
        return Err(DecodeError::UnsupportedLayer {
            layer: Layer::Network,
            id: version as u32,
        });
    }

    let header_len = ((bytes[0] & 0x0f) as usize) * 4;
    if header_len < IPV4_MIN_HEADER_LEN {
        return Err(DecodeError::truncated(
            Layer::Network,
            IPV4_MIN_HEADER_LEN,
            header_len,
        ));
    }
    if bytes.len() < header_len {
        return Err(DecodeError::truncated(
            Layer::Network,
            header_len,
            bytes.len(),
        ));
    }

    let total_len = read_u16(bytes, 2) as usize;
    if total_len < header_len {
        return Err(DecodeError::truncated(Layer::Network, header_len, total_len));
    }
    if total_len > bytes.len() {
        return Err(DecodeError::truncated(
            Layer::Network,
            total_len,
            bytes.len(),
        ));
    }

    Ok(Ipv4Packet {
        source: Ipv4Addr::new(bytes[12], bytes[13], bytes[14], bytes[15]),
        destination: Ipv4Addr::new(bytes[16], bytes[17], bytes[18], bytes[19]),
        protocol_id: bytes[9],
        fragment_offset: read_u16(bytes, 6) & 0x1fff,
        // anything past total_len is link-layer padding
        transport_payload: &bytes[header_len..total_len],
    })
}
