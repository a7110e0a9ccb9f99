//! Shared helpers: hex encoding and logging.

pub mod hex;
pub mod log;
