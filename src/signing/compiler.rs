//! Transaction Compilation
//!
//! Attaches a recovered signature to an unsigned transaction and produces
//! the broadcast-ready bytes.

use super::finalizer::RecoveredSignature;
use super::preimage::UnsignedTransaction;
use super::rlp;
use crate::utils::crypto::keccak256;
use ethers_core::types::U256;
use serde::{Serialize, Serializer};

/// Compiled (signed) transaction ready for broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTransaction {
    /// Raw signed transaction bytes
    pub raw_tx: Vec<u8>,
    /// keccak256 of `raw_tx`
    pub tx_hash: [u8; 32],
}

impl CompiledTransaction {
    /// Wrap already-signed bytes, e.g. produced by another tool
    pub fn from_raw(raw_tx: Vec<u8>) -> Self {
        let tx_hash = keccak256(&raw_tx);
        Self { raw_tx, tx_hash }
    }

    /// `0x`-prefixed hex of the raw bytes, as `eth_sendRawTransaction` expects
    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw_tx))
    }

    pub fn tx_hash_hex(&self) -> String {
        format!("0x{}", hex::encode(self.tx_hash))
    }
}

impl Serialize for CompiledTransaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire {
            raw_tx: String,
            tx_hash: String,
        }
        Wire {
            raw_tx: self.raw_hex(),
            tx_hash: self.tx_hash_hex(),
        }
        .serialize(serializer)
    }
}

/// EIP-155 `v` for a legacy transaction: `recovery_id + 35 + 2 * chain_id`
pub fn eip155_v(recovery_id: u8, chain_id: u64) -> U256 {
    U256::from(chain_id) * U256::from(2u64) + U256::from(35u64) + U256::from(recovery_id)
}

/// Encode `rlp([nonce, gasPrice, gasLimit, to, value, data, v, r, s])`.
///
/// `r` and `s` are written as minimal integers; a signature whose `r`
/// starts with a zero byte still produces canonical RLP.
pub fn encode_legacy(tx: &UnsignedTransaction, signature: &RecoveredSignature) -> CompiledTransaction {
    let mut items = tx.rlp_fields();
    items.push(rlp::encode_u256(eip155_v(signature.recovery_id, tx.chain_id)));
    items.push(rlp::encode_scalar(&signature.r));
    items.push(rlp::encode_scalar(&signature.s));

    let raw_tx = rlp::encode_list(&items);
    let tx_hash = keccak256(&raw_tx);

    CompiledTransaction { raw_tx, tx_hash }
}
