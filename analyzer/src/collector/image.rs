//! Image URI extraction from HTTP GET requests

use super::artifact::{payload_text, ArtifactSet};
use super::{Collector, CollectorError};
use once_cell::sync::Lazy;
use pcaplens_shared::{DecodedPacket, ImageKind, ImageRow, IpProtocol, Timestamp};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// Default display width for the `uri` column
pub const DEFAULT_URI_DISPLAY_MAX: usize = 100;

/// Extensions checked against each request, in order. A URI matching several
/// produces one row per match.
const EXTENSIONS: [(&str, ImageKind); 4] = [
    (".gif", ImageKind::Gif),
    (".jpg", ImageKind::Jpg),
    (".jpeg", ImageKind::Jpg),
    (".png", ImageKind::Png),
];

static FILENAMES: Lazy<[Regex; 4]> = Lazy::new(|| {
    EXTENSIONS.map(|(ext, _)| {
        Regex::new(&format!(r"[a-z0-9_.+-]+{}", regex::escape(ext)))
            .expect("filename pattern is valid")
    })
});

/// Per-type totals; `.jpeg` counts as jpg
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImageCounts {
    pub gif: u64,
    pub jpg: u64,
    pub png: u64,
}

impl ImageCounts {
    fn bump(&mut self, kind: ImageKind) {
        match kind {
            ImageKind::Gif => self.gif += 1,
            ImageKind::Jpg => self.jpg += 1,
            ImageKind::Png => self.png += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.gif + self.jpg + self.png
    }
}

/// The parts of an HTTP request line and headers the extractor needs
struct GetRequest<'a> {
    host: &'a str,
    path: &'a str,
}

/// Parse a GET request with a Host header. Anything else is `None`.
fn parse_get(text: &str) -> Option<GetRequest<'_>> {
    let mut lines = text.lines();

    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?;
    let path = request_line.next()?;
    let version = request_line.next()?;
    if method != "GET" || !version.starts_with("HTTP/") {
        return None;
    }

    let host = lines
        .take_while(|line| !line.trim().is_empty())
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("host"))
        .map(|(_, value)| value.trim())?;

    Some(GetRequest { host, path })
}

/// Image requests seen in TCP payloads
#[derive(Debug)]
pub struct ImageUriExtractor {
    uri_display_max: usize,
    rows: Vec<ImageRow>,

    /// Full lowercased `host + path` of every matching request
    uris: ArtifactSet,
    counts: ImageCounts,
    undecodable: u64,
}

impl Default for ImageUriExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_URI_DISPLAY_MAX)
    }
}

impl ImageUriExtractor {
    pub fn new(uri_display_max: usize) -> Self {
        Self {
            uri_display_max,
            rows: Vec::new(),
            uris: ArtifactSet::new(),
            counts: ImageCounts::default(),
            undecodable: 0,
        }
    }

    /// One row per matched extension, in capture order
    pub fn rows(&self) -> &[ImageRow] {
        &self.rows
    }

    pub fn uris(&self) -> &ArtifactSet {
        &self.uris
    }

    pub fn counts(&self) -> ImageCounts {
        self.counts
    }

    /// Type totals in JPG, GIF, PNG order
    pub fn summary_rows(&self) -> [(&'static str, u64); 3] {
        [
            ("JPG", self.counts.jpg),
            ("GIF", self.counts.gif),
            ("PNG", self.counts.png),
        ]
    }

    /// Payloads skipped because they were not valid text
    pub fn undecodable(&self) -> u64 {
        self.undecodable
    }

    fn record(&mut self, source: String, destination: String, uri: String) {
        let display: String = uri.chars().take(self.uri_display_max).collect();

        for ((ext, kind), pattern) in EXTENSIONS.iter().zip(FILENAMES.iter()) {
            if !uri.contains(ext) {
                continue;
            }

            let filename = pattern
                .find(&uri)
                .map(|m| m.as_str().to_string())
                .or_else(|| uri.rsplit('/').next().map(str::to_string))
                .unwrap_or_default();

            self.rows.push(ImageRow {
                source: source.clone(),
                destination: destination.clone(),
                kind: *kind,
                filename,
                uri: format!("http://{}", display),
            });
            self.counts.bump(*kind);
            self.uris.insert(uri.as_str());
        }
    }
}

impl Collector for ImageUriExtractor {
    fn name(&self) -> &'static str {
        "image_uris"
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

        let text = match payload_text(payload) {
            Ok(text) => text,
            Err(e) => {
                debug!("Image scan skipped payload from {}: {}", ip.source, e);
                self.undecodable += 1;
                return Ok(());
            }
        };

        if let Some(request) = parse_get(text) {
            let uri = format!("{}{}", request.host, request.path).to_lowercase();
            self.record(ip.source.to_string(), ip.destination.to_string(), uri);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::testing::{ipv4, tcp_segment};

    const CLIENT: [u8; 4] = [10, 1, 1, 5];
    const SERVER: [u8; 4] = [93, 184, 216, 34];

    fn feed(extractor: &mut ImageUriExtractor, payload: &str) {
        let segment = tcp_segment(payload.as_bytes());
        extractor
            .update(&ipv4(CLIENT, SERVER, 6, &segment), 54 + payload.len(), 0.0)
            .unwrap();
    }

    fn get(host: &str, path: &str) -> String {
        format!(
            "GET {} HTTP/1.1\r\nHost: {}\r\nAccept: */*\r\n\r\n",
            path, host
        )
    }

    #[test]
    fn test_single_image_request() {
        let mut extractor = ImageUriExtractor::default();
        feed(&mut extractor, &get("Example.COM", "/img/Logo.PNG"));

        assert_eq!(extractor.rows().len(), 1);
        let row = &extractor.rows()[0];
        assert_eq!(row.source, "10.1.1.5");
        assert_eq!(row.destination, "93.184.216.34");
        assert_eq!(row.kind, ImageKind::Png);
        assert_eq!(row.filename, "logo.png");
        assert_eq!(row.uri, "http://example.com/img/logo.png");
        assert_eq!(extractor.uris().as_slice(), &["example.com/img/logo.png".to_string()]);
        assert_eq!(extractor.counts().png, 1);
    }

    #[test]
    fn test_multiple_extensions_produce_multiple_rows() {
        let mut extractor = ImageUriExtractor::default();
        feed(&mut extractor, &get("cdn.test", "/thumb.gif?full=photo.jpeg"));

        let kinds: Vec<ImageKind> = extractor.rows().iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![ImageKind::Gif, ImageKind::Jpg]);
        assert_eq!(extractor.rows()[0].filename, "thumb.gif");
        assert_eq!(extractor.rows()[1].filename, "photo.jpeg");
        assert_eq!(extractor.counts(), ImageCounts { gif: 1, jpg: 1, png: 0 });
        // same URI, recorded once
        assert_eq!(extractor.uris().len(), 1);
    }

    #[test]
    fn test_repeated_request_adds_rows_but_one_uri() {
        let mut extractor = ImageUriExtractor::default();
        feed(&mut extractor, &get("a.test", "/x.jpg"));
        feed(&mut extractor, &get("a.test", "/x.jpg"));

        assert_eq!(extractor.rows().len(), 2);
        assert_eq!(extractor.uris().len(), 1);
        assert_eq!(extractor.counts().jpg, 2);
    }

    #[test]
    fn test_display_uri_is_truncated() {
        let mut extractor = ImageUriExtractor::new(12);
        feed(&mut extractor, &get("images.example.org", "/very/long/path/cat.gif"));

        let row = &extractor.rows()[0];
        assert_eq!(row.uri, "http://images.examp");
        assert_eq!(extractor.uris().as_slice()[0], "images.example.org/very/long/path/cat.gif");
    }

    #[test]
    fn test_non_get_and_non_http_are_ignored() {
        let mut extractor = ImageUriExtractor::default();
        feed(&mut extractor, "POST /upload.png HTTP/1.1\r\nHost: a.test\r\n\r\n");
        feed(&mut extractor, "GET /a.png\r\n");
        feed(&mut extractor, "GET /b.png HTTP/1.0\r\nAccept: */*\r\n\r\n");
        feed(&mut extractor, "220 smtp.example.com ESMTP ready\r\n");

        assert!(extractor.rows().is_empty());
        assert_eq!(extractor.counts().total(), 0);
        assert_eq!(extractor.undecodable(), 0);
    }

    #[test]
    fn test_request_without_image_is_ignored() {
        let mut extractor = ImageUriExtractor::default();
        feed(&mut extractor, &get("a.test", "/index.html"));
        assert!(extractor.rows().is_empty());
        assert!(extractor.uris().is_empty());
    }

    #[test]
    fn test_binary_payload_is_no_match() {
        let mut extractor = ImageUriExtractor::default();
        let segment = tcp_segment(&[0x47, 0x45, 0x54, 0x20, 0xc3, 0x28]);
        extractor
            .update(&ipv4(CLIENT, SERVER, 6, &segment), 60, 0.0)
            .unwrap();

        assert!(extractor.rows().is_empty());
        assert_eq!(extractor.undecodable(), 1);
    }

    #[test]
    fn test_summary_rows_order() {
        let mut extractor = ImageUriExtractor::default();
        feed(&mut extractor, &get("a.test", "/1.png"));
        feed(&mut extractor, &get("a.test", "/2.gif"));
        feed(&mut extractor, &get("a.test", "/3.gif"));

        assert_eq!(
            extractor.summary_rows(),
            [("JPG", 0), ("GIF", 2), ("PNG", 1)]
        );
    }
}
