//! Artifact sets and payload text helpers
//!
//! Artifacts are application-layer strings (mail addresses, resource URIs)
//! pulled out of payload text. They are kept deduplicated in first-seen order.

use serde::{Serialize, Serializer};
use std::collections::HashSet;
use thiserror::Error;

/// Insertion-ordered set of strings
#[derive(Debug, Clone, Default)]
pub struct ArtifactSet {
    items: Vec<String>,
    seen: HashSet<String>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value; returns false if it was already present
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.seen.contains(&value) {
            return false;
        }
        self.seen.insert(value.clone());
        self.items.push(value);
        true
    }

    pub fn contains(&self, value: &str) -> bool {
        self.seen.contains(value)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Values in the order they were first inserted
    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }
}

impl Serialize for ArtifactSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.items)
    }
}

/// Why a payload yielded no artifacts
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Payload bytes are not valid text
    #[error("payload is not valid UTF-8: {0}")]
    TextDecode(#[from] std::str::Utf8Error),
}

/// View a payload as text
pub fn payload_text(payload: &[u8]) -> Result<&str, ExtractError> {
    Ok(std::str::from_utf8(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_deduplicates_and_keeps_order() {
        let mut set = ArtifactSet::new();
        assert!(set.insert("To:bob@example.com"));
        assert!(set.insert("From:alice@example.com"));
        assert!(!set.insert("To:bob@example.com"));

        assert_eq!(set.len(), 2);
        assert_eq!(
            set.as_slice(),
            &["To:bob@example.com".to_string(), "From:alice@example.com".to_string()]
        );
        assert!(set.contains("From:alice@example.com"));
    }

    #[test]
    fn test_serializes_as_list() {
        let mut set = ArtifactSet::new();
        set.insert("a");
        set.insert("b");
        set.insert("a");
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["a","b"]"#);
    }

    #[test]
    fn test_payload_text() {
        assert_eq!(payload_text(b"MAIL FROM: <a@b.c>").unwrap(), "MAIL FROM: <a@b.c>");
        assert!(matches!(
            payload_text(&[0xff, 0xfe, 0x00]),
            Err(ExtractError::TextDecode(_))
        ));
    }
}
