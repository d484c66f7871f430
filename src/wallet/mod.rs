//! Wallet Module
//!
//! Address derivation from card public keys, decimal amount handling, and
//! transaction-count tracking.

mod address;
mod amount;
pub mod nonce;

pub use address::*;
pub use amount::*;
pub use nonce::NonceTracker;
