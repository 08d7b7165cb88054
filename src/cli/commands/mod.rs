//! Command implementations

pub mod init;
pub mod scrub;
pub mod validate;
