//! Mail address extraction
//!
//! Scans TCP payload text for mail-transfer commands of the form
//! `TO: <user@host>` and `FROM: <user@host>` and records each direction and
//! address pair once.
//!
//! Matching is not tied to port 25 or to SMTP session state. Any TCP payload
//! containing a command-shaped substring counts, including e.g. a web page
//! quoting an SMTP dialogue.

use super::artifact::{payload_text, ArtifactSet, ExtractError};
use super::{Collector, CollectorError};
use once_cell::sync::Lazy;
use pcaplens_shared::{DecodedPacket, IpProtocol, Timestamp};
use regex::Regex;
use tracing::debug;

static TO_COMMAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"TO: ?<([a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+)>")
        .expect("TO pattern is valid")
});

static FROM_COMMAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"FROM: ?<([a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+)>")
        .expect("FROM pattern is valid")
});

/// Unique `To:`/`From:` addresses seen in TCP payloads
#[derive(Debug, Default)]
pub struct MailAddressExtractor {
    addresses: ArtifactSet,

    /// Payloads skipped because they were not valid text
    undecodable: u64,
}

impl MailAddressExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// `To:<addr>` / `From:<addr>` entries in first-seen order
    pub fn addresses(&self) -> &ArtifactSet {
        &self.addresses
    }

    pub fn undecodable(&self) -> u64 {
        self.undecodable
    }

    fn scan(&mut self, payload: &[u8]) -> Result<(), ExtractError> {
        let text = payload_text(payload)?;

        for caps in TO_COMMAND.captures_iter(text) {
            self.addresses.insert(format!("To:{}", &caps[1]));
        }
        for caps in FROM_COMMAND.captures_iter(text) {
            self.addresses.insert(format!("From:{}", &caps[1]));
        }
        Ok(())
    }
}

impl Collector for MailAddressExtractor {
    fn name(&self) -> &'static str {
        "mail_addresses"
    }

    fn update(
        &mut self,
        packet: &DecodedPacket<'_>,
        _raw_len: usize,
        _ts: Timestamp,
    ) -> Result<(), CollectorError> {
        let ip = match packet.ipv4() {
            Some(ip) if ip.protocol() == IpProtocol::Tcp && !ip.is_fragment() => ip,
            _ => return Ok(()),
        };

        let payload = ip.tcp_payload()?;
        if payload.is_empty() {
            return Ok(());
        }

        if let Err(e) = self.scan(payload) {
            // not text, so nothing to match
            debug!("Mail scan skipped payload from {}: {}", ip.source, e);
            self.undecodable += 1;
        }
        Ok(())
    }
}
