//! Error types shared by the decoder and the statistics helpers

use thiserror::Error;

/// Protocol layer a decode failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Link,
    Network,
    Transport,
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layer::Link => write!(f, "link"),
            Layer::Network => write!(f, "network"),
            Layer::Transport => write!(f, "transport"),
        }
    }
}

/// Why a single frame could not be decoded.
///
/// Decode failures are per-record and always recoverable: the pipeline
/// counts them and moves on to the next record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Fewer bytes than a header (or its declared length) requires
    #[error("truncated {layer} header: need {needed} bytes, have {available}")]
    Truncated {
        layer: Layer,
        needed: usize,
        available: usize,
    },

    /// A link type, ethertype or IP version outside the decoded set
    #[error("unsupported {layer} protocol {id:#06x}")]
    UnsupportedLayer { layer: Layer, id: u32 },
}

impl DecodeError {
    pub(crate) fn truncated(layer: Layer, needed: usize, available: usize) -> Self {
        DecodeError::Truncated {
            layer,
            needed,
            available,
        }
    }
}

/// A statistic that is undefined for the given input (e.g. a mean of no values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{statistic} is undefined for {samples} sample(s)")]
pub struct ComputeUndefined {
    pub statistic: &'static str,
    pub samples: usize,
}
