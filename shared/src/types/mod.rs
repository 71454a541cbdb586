//! Type definitions shared by the decoder, the analyzer and the CLI

pub mod capture;
pub mod packet;
pub mod report;
