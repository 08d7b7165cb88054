//! Core domain types
//!
//! Error hierarchy and result alias shared by every layer.

pub mod errors;
pub mod result;

pub use errors::PipeguardError;
pub use result::Result;
