//! Shared helpers: hashing, log setup and redaction, node endpoint checks.

pub mod crypto;
pub mod logging;
pub mod network_config;

pub use crypto::{keccak256, to_checksum_address};
