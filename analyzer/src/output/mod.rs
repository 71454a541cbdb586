//! Report rendering

pub mod json;
pub mod table;
