//! Chain rules
//!
//! A [`ChainRule`] describes everything the signing core needs to know about
//! a network: which curve its keys live on, how addresses and signing hashes
//! are computed, which recovery ids are legal, and how signed transactions
//! are serialized. One engine implementation serves every chain through it.

mod evm;

pub use evm::EvmChainRule;

use crate::crypto::curves::CurveType;
use crate::error::WalletResult;
use crate::signing::{CompiledTransaction, RecoveredSignature, RecoveryIdSet, UnsignedTransaction};
use crate::types::{Address, Chain, PublicKey, SigningHash};

/// Gas budget for a plain value transfer
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Capability descriptor for one chain
pub trait ChainRule: Send + Sync {
    fn chain(&self) -> Chain;

    /// Curve the account keys live on
    fn curve(&self) -> CurveType;

    fn chain_id(&self) -> u64 {
        self.chain().chain_id()
    }

    /// Scaling between display units and minor units
    fn decimals(&self) -> u8 {
        self.chain().decimals()
    }

    fn gas_limit(&self) -> u64 {
        TRANSFER_GAS_LIMIT
    }

    fn recovery_ids(&self) -> RecoveryIdSet;

    fn derive_address(&self, public_key: &PublicKey) -> WalletResult<Address>;

    fn validate_address(&self, address: &str) -> bool;

    fn signing_hash(&self, tx: &UnsignedTransaction) -> SigningHash;

    fn encode_signed(&self, tx: &UnsignedTransaction, signature: &RecoveredSignature) -> CompiledTransaction;

    /// Block explorer page for an address
    fn explorer_link(&self, address: &Address) -> String;

    /// Payment URI for QR codes
    fn qr_payload(&self, address: &Address) -> String;
}
