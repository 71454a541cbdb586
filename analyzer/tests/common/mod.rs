//! Synthetic capture builders shared by the integration tests

#![allow(dead_code)]

pub const TCP: u8 = 6;
pub const UDP: u8 = 17;
pub const IGMP: u8 = 2;

/// 2019-11-04 09:12:40 UTC
pub const T0: u32 = 1_572_858_760;

/// Ethernet II + IPv4 (no options) around `transport`
pub fn ethernet_ipv4(src: [u8; 4], dst: [u8; 4], protocol: u8, transport: &[u8]) -> Vec<u8> {
    let mut frame = vec![0u8; 12];
    frame.extend_from_slice(&0x0800u16.to_be_bytes());

    let total_len = (20 + transport.len()) as u16;
    let mut ip = vec![0u8; 20];
    ip[0] = 0x45;
    ip[2..4].copy_from_slice(&total_len.to_be_bytes());
    ip[8] = 64;
    ip[9] = protocol;
    ip[12..16].copy_from_slice(&src);
    ip[16..20].copy_from_slice(&dst);

    frame.extend_from_slice(&ip);
    frame.extend_from_slice(transport);
    frame
}

pub fn tcp(payload: &[u8]) -> Vec<u8> {
    let mut segment = vec![0u8; 20];
    segment[0..2].copy_from_slice(&51000u16.to_be_bytes());
    segment[2..4].copy_from_slice(&80u16.to_be_bytes());
    segment[12] = 5 << 4;
    segment.extend_from_slice(payload);
    segment
}

pub fn udp(payload: &[u8]) -> Vec<u8> {
    let mut datagram = vec![0u8; 8];
    datagram[0..2].copy_from_slice(&5353u16.to_be_bytes());
    datagram[2..4].copy_from_slice(&53u16.to_be_bytes());
    datagram[4..6].copy_from_slice(&((8 + payload.len()) as u16).to_be_bytes());
    datagram.extend_from_slice(payload);
    datagram
}

/// Little-endian, microsecond, Ethernet pcap writer
pub struct PcapBuilder {
    bytes: Vec<u8>,
    records: usize,
}

impl Default for PcapBuilder {
    fn default() -> Self {
        Self::new(1)
    }
}

impl PcapBuilder {
    pub fn new(linktype: u32) -> Self {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&4u16.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 8]);
        bytes.extend_from_slice(&65535u32.to_le_bytes());
        bytes.extend_from_slice(&linktype.to_le_bytes());
        Self { bytes, records: 0 }
    }

    pub fn record(mut self, sec: u32, usec: u32, frame: &[u8]) -> Self {
        self.bytes.extend_from_slice(&sec.to_le_bytes());
        self.bytes.extend_from_slice(&usec.to_le_bytes());
        self.bytes.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        self.bytes.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        self.bytes.extend_from_slice(frame);
        self.records += 1;
        self
    }

    pub fn records(&self) -> usize {
        self.records
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

pub const CLIENT: [u8; 4] = [192, 168, 1, 10];
pub const WEB: [u8; 4] = [93, 184, 216, 34];
pub const MAIL: [u8; 4] = [192, 168, 1, 25];
pub const DNS: [u8; 4] = [8, 8, 8, 8];

/// Ten records: six TCP (one SMTP command, one image GET), three UDP and
/// one frame too short for an Ethernet header
pub fn mixed_capture() -> PcapBuilder {
    let get = b"GET /static/logo.png HTTP/1.1\r\nHost: www.example.com\r\n\r\n";
    let smtp = b"RCPT TO: <bob@example.org>\r\n";

    PcapBuilder::default()
        .record(T0, 0, &ethernet_ipv4(CLIENT, WEB, TCP, &tcp(b"")))
        .record(T0 + 1, 0, &ethernet_ipv4(WEB, CLIENT, TCP, &tcp(b"")))
        .record(T0 + 2, 500_000, &ethernet_ipv4(CLIENT, WEB, TCP, &tcp(get)))
        .record(T0 + 5, 0, &ethernet_ipv4(CLIENT, DNS, UDP, &udp(b"query")))
        .record(T0 + 6, 0, &ethernet_ipv4(DNS, CLIENT, UDP, &udp(b"answer")))
        .record(T0 + 9, 0, &[0xff; 6])
        .record(T0 + 25, 0, &ethernet_ipv4(CLIENT, MAIL, TCP, &tcp(smtp)))
        .record(T0 + 26, 0, &ethernet_ipv4(MAIL, CLIENT, TCP, &tcp(b"250 OK\r\n")))
        .record(T0 + 45, 0, &ethernet_ipv4(CLIENT, DNS, UDP, &udp(b"query")))
        .record(T0 + 47, 0, &ethernet_ipv4(CLIENT, WEB, TCP, &tcp(b"")))
}
