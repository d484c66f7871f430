//! Ethereum Pre-Image Hashing
//!
//! Signing hashes for legacy transactions with EIP-155 replay protection.

use super::rlp;
use crate::types::{Address, SigningHash};
use crate::utils::crypto::keccak256;
use ethers_core::types::U256;
use serde::{Deserialize, Serialize};

/// Unsigned legacy value transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    /// Sender nonce
    pub nonce: u64,
    /// Recipient
    pub destination: Address,
    /// Value in minor units
    pub value: U256,
    pub gas_limit: u64,
    /// Gas price in minor units
    pub gas_price: U256,
    /// EIP-155 chain id
    pub chain_id: u64,
}

impl UnsignedTransaction {
    /// RLP items `[nonce, gasPrice, gasLimit, to, value, data]`
    pub(crate) fn rlp_fields(&self) -> Vec<Vec<u8>> {
        vec![
            rlp::encode_u64(self.nonce),
            rlp::encode_u256(self.gas_price),
            rlp::encode_u64(self.gas_limit),
            rlp::encode_address(self.destination.as_bytes()),
            rlp::encode_u256(self.value),
            rlp::encode_bytes(&[]),
        ]
    }
}

/// Signing hash for a legacy transaction.
///
/// `keccak256(rlp([nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0]))`
pub fn legacy_signing_hash(tx: &UnsignedTransaction) -> SigningHash {
    let mut items = tx.rlp_fields();
    items.push(rlp::encode_u64(tx.chain_id));
    items.push(rlp::encode_u64(0));
    items.push(rlp::encode_u64(0));

    SigningHash::new(keccak256(&rlp::encode_list(&items)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eip155_example() -> UnsignedTransaction {
        UnsignedTransaction {
            nonce: 9,
            destination: "0x3535353535353535353535353535353535353535".parse().unwrap(),
            value: U256::exp10(18),
            gas_limit: 21000,
            gas_price: U256::from(20_000_000_000u64),
            chain_id: 1,
        }
    }

    #[test]
    fn test_eip155_signing_hash() {
        // Example transaction from the EIP-155 document
        let hash = legacy_signing_hash(&eip155_example());
        assert_eq!(
            hash.to_hex(),
            "0xdaf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        );
    }

    #[test]
    fn test_chain_id_separates_domains() {
        let mainnet = eip155_example();
        let mut polygon = mainnet.clone();
        polygon.chain_id = 137;
        assert_ne!(legacy_signing_hash(&mainnet), legacy_signing_hash(&polygon));
    }
}
