//! EVM chain rule
//!
//! Legacy transactions with EIP-155 replay protection. The same rule covers
//! Ethereum and its L2s and sidechains; only the chain id and explorer
//! differ. Nodes recover the sender with secp256k1 ecrecover, so that is
//! the only curve an account can sign with.

use super::ChainRule;
use crate::crypto::curves::CurveType;
use crate::error::{WalletError, WalletResult};
use crate::signing::{self, CompiledTransaction, RecoveredSignature, RecoveryIdSet, UnsignedTransaction};
use crate::types::{Address, Chain, PublicKey, SigningHash};
use crate::wallet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvmChainRule {
    chain: Chain,
    curve: CurveType,
}

impl EvmChainRule {
    /// Rule for `chain` with keys on `curve`.
    ///
    /// Any curve other than secp256k1 is rejected: a transaction signed on
    /// it could never be attributed to the derived address.
    pub fn new(chain: Chain, curve: CurveType) -> WalletResult<Self> {
        if curve != CurveType::Secp256k1 {
            return Err(WalletError::invalid_config(format!(
                "{} cannot sign {} transactions",
                curve, chain
            )));
        }
        Ok(Self { chain, curve })
    }

    /// secp256k1 rule for `chain`
    pub fn secp256k1(chain: Chain) -> Self {
        Self { chain, curve: CurveType::Secp256k1 }
    }

    pub fn ethereum() -> Self {
        Self::secp256k1(Chain::Ethereum)
    }
}

impl ChainRule for EvmChainRule {
    fn chain(&self) -> Chain {
        self.chain
    }

    fn curve(&self) -> CurveType {
        self.curve
    }

    fn recovery_ids(&self) -> RecoveryIdSet {
        RecoveryIdSet::ETHEREUM
    }

    fn derive_address(&self, public_key: &PublicKey) -> WalletResult<Address> {
        wallet::derive_address(public_key)
    }

    fn validate_address(&self, address: &str) -> bool {
        wallet::validate_address(address)
    }

    fn signing_hash(&self, tx: &UnsignedTransaction) -> SigningHash {
        signing::legacy_signing_hash(tx)
    }

    fn encode_signed(&self, tx: &UnsignedTransaction, signature: &RecoveredSignature) -> CompiledTransaction {
        signing::encode_legacy(tx, signature)
    }

    fn explorer_link(&self, address: &Address) -> String {
        format!("{}/address/{}", self.chain.explorer_base(), address)
    }

    fn qr_payload(&self, address: &Address) -> String {
        format!("{}{}", self.chain.qr_prefix(), address)
    }
}
