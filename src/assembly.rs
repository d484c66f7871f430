//! Engine assembly
//!
//! A card can hold one wallet per curve. For every chain the caller wants,
//! the assembly picks the card wallet on that chain's curve and builds an
//! engine from it.

use crate::api::NodeClient;
use crate::chain::ChainRule;
use crate::crypto::curves::CurveType;
use crate::engine::{EngineOptions, WalletEngine};
use crate::error::WalletResult;
use crate::types::PublicKey;
use crate::utils::logging::redact_value;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One key pair held by the card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardWallet {
    pub curve: CurveType,
    pub public_key: PublicKey,
}

/// Public information read from a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInfo {
    pub card_id: String,
    pub wallets: Vec<CardWallet>,
}

impl CardInfo {
    /// First wallet on `curve`
    pub fn wallet_for(&self, curve: CurveType) -> Option<&CardWallet> {
        self.wallets.iter().find(|w| w.curve == curve)
    }
}

pub struct EngineAssembly {
    options: EngineOptions,
}

impl EngineAssembly {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    /// One engine per rule for which the card has a wallet on the rule's
    /// curve.
    ///
    /// Rules without such a wallet are skipped, as are wallets whose key is
    /// rejected. `node_for` supplies the node client for each rule.
    pub fn make_engines<R, N, F>(&self, card: &CardInfo, rules: Vec<R>, mut node_for: F) -> Vec<WalletEngine<R, N>>
    where
        R: ChainRule,
        N: NodeClient,
        F: FnMut(&R) -> WalletResult<Arc<N>>,
    {
        let card_id = redact_value(&card.card_id);
        let mut engines = Vec::with_capacity(rules.len());

        for rule in rules {
            let chain = rule.chain();
            let Some(wallet) = card.wallet_for(rule.curve()) else {
                tracing::debug!(card = %card_id, chain = %chain, curve = %rule.curve(), "no card wallet for curve");
                continue;
            };

            let node = match node_for(&rule) {
                Ok(node) => node,
                Err(e) => {
                    tracing::warn!(card = %card_id, chain = %chain, error = %e, "no node client");
                    continue;
                }
            };

            match WalletEngine::with_options(rule, wallet.public_key.clone(), node, self.options) {
                Ok(engine) => engines.push(engine),
                Err(e) => tracing::warn!(card = %card_id, chain = %chain, error = %e, "skipping wallet"),
            }
        }

        engines
    }
}

impl Default for EngineAssembly {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BlockTag;
    use crate::chain::EvmChainRule;
    use crate::types::{Address, Chain, TransactionId};
    use ethers_core::types::U256;

    struct IdleNode;

    impl NodeClient for IdleNode {
        async fn gas_price(&self) -> WalletResult<U256> {
            Ok(U256::one())
        }

        async fn send_raw_transaction(&self, _raw_tx: &[u8]) -> WalletResult<TransactionId> {
            Ok(TransactionId::new("0x00"))
        }

        async fn transaction_count(&self, _address: &Address, _block: BlockTag) -> WalletResult<u64> {
            Ok(0)
        }
    }

    const K1_KEY: &str = "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8";

    fn card(wallets: Vec<CardWallet>) -> CardInfo {
        CardInfo {
            card_id: "CB79000000018201".to_string(),
            wallets,
        }
    }

    fn k1_wallet() -> CardWallet {
        CardWallet {
            curve: CurveType::Secp256k1,
            public_key: PublicKey::from_hex(K1_KEY).unwrap(),
        }
    }

    #[test]
    fn test_one_engine_per_matching_rule() {
        let card = card(vec![
            CardWallet {
                curve: CurveType::Ed25519,
                public_key: PublicKey::new(vec![7u8; 32]),
            },
            k1_wallet(),
        ]);
        let rules = vec![
            EvmChainRule::ethereum(),
            EvmChainRule::secp256k1(Chain::Polygon),
        ];

        let engines = EngineAssembly::default().make_engines(&card, rules, |_| Ok(Arc::new(IdleNode)));
        let chains: Vec<Chain> = engines.iter().map(|e| e.rule().chain()).collect();
        assert_eq!(chains, vec![Chain::Ethereum, Chain::Polygon]);
        assert!(engines.iter().all(|e| e.address() == engines[0].address()));
    }

    #[test]
    fn test_card_without_secp256k1_wallet() {
        let card = card(vec![CardWallet {
            curve: CurveType::Secp256r1,
            public_key: PublicKey::from_hex(K1_KEY).unwrap(),
        }]);
        let rules = vec![EvmChainRule::ethereum(), EvmChainRule::secp256k1(Chain::Base)];
        let engines = EngineAssembly::default().make_engines(&card, rules, |_| Ok(Arc::new(IdleNode)));
        assert!(engines.is_empty());
    }

    #[test]
    fn test_skips_rejected_keys() {
        let card = card(vec![CardWallet {
            curve: CurveType::Secp256k1,
            public_key: PublicKey::new(vec![0x04; 10]),
        }]);
        let engines = EngineAssembly::default().make_engines(&card, vec![EvmChainRule::ethereum()], |_| {
            Ok(Arc::new(IdleNode))
        });
        assert!(engines.is_empty());
    }

    #[test]
    fn test_skips_rules_without_node() {
        let card = card(vec![k1_wallet()]);
        let engines: Vec<WalletEngine<EvmChainRule, IdleNode>> = EngineAssembly::default().make_engines(
            &card,
            vec![EvmChainRule::ethereum()],
            |_| Err(crate::error::WalletError::invalid_config("no endpoint")),
        );
        assert!(engines.is_empty());
    }
}
