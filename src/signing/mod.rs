//! External Signature Compilation
//!
//! The card signs hashes, never transactions. This module covers both sides
//! of that boundary:
//! 1. Compute the signing hash of an unsigned transaction
//! 2. Turn the card's bare `r‖s` into a canonical signature with its `v`
//! 3. Compile the signed transaction bytes

pub mod compiler;
pub mod finalizer;
pub mod preimage;
pub mod rlp;

pub use compiler::{encode_legacy, CompiledTransaction};
pub use finalizer::{finalize, RecoveredSignature, RecoveryIdSet};
pub use preimage::{legacy_signing_hash, UnsignedTransaction};
