//! Shared types and utilities for pcaplens
//!
//! This crate contains the packet data model, the frame decoder and the
//! small numeric/time helpers used by the analyzer and the CLI.

pub mod decode;
pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use decode::{decode, Decoder};
pub use error::{ComputeUndefined, DecodeError, Layer};
pub use types::{capture::*, packet::*, report::*};
