//! Card Wallet Core
//!
//! Signing core for EVM wallets whose keys live on a hardware card.
//!
//! # Architecture
//!
//! The card holds the private key and signs 32-byte hashes. Everything else
//! happens here:
//! - **wallet**: Address derivation, amount parsing, nonce tracking
//! - **fees**: Three-tier fee quotes from the node gas price
//! - **tx**: Unsigned transaction building and broadcasting
//! - **signing**: Signing hash, low-S finalization, EIP-155 serialization
//! - **chain**: Per-chain rules the engine is generic over
//! - **engine**: One [`WalletEngine`] per card wallet and chain
//! - **api**: The [`NodeClient`] network boundary and its JSON-RPC client
//!
//! # Send flow
//!
//! ```rust,ignore
//! use card_wallet_core::{EvmChainRule, JsonRpcClient, RawSignature, WalletEngine};
//! use tokio_util::sync::CancellationToken;
//!
//! let node = Arc::new(JsonRpcClient::new("https://eth.llamarpc.com", timeout)?);
//! let engine = WalletEngine::new(EvmChainRule::ethereum(), card_public_key, node)?;
//! let cancel = CancellationToken::new();
//!
//! engine.sync_transaction_count(&cancel).await?;
//! let fees = engine.estimate_fee(destination, "0.5", &cancel).await?;
//! let pending = engine.build_unsigned("0.5", &fees.normal, destination, false).await?;
//!
//! let raw = card.sign(pending.hash.as_bytes())?;
//! let receipt = engine.send(&RawSignature::from_slice(&raw)?, &cancel).await?;
//! println!("{}", engine.rule().explorer_link(engine.address()));
//! ```

pub mod api;
pub mod assembly;
pub mod chain;
pub mod config;
pub mod crypto;
pub mod engine;
pub mod error;
pub mod fees;
pub mod signing;
pub mod tx;
pub mod types;
pub mod utils;
pub mod wallet;

pub use api::{BlockTag, JsonRpcClient, NodeClient};
pub use assembly::{CardInfo, CardWallet, EngineAssembly};
pub use chain::{ChainRule, EvmChainRule, TRANSFER_GAS_LIMIT};
pub use config::EngineConfig;
pub use crypto::CurveType;
pub use engine::{EngineOptions, SendReceipt, WalletEngine};
pub use error::{ErrorCategory, ErrorCode, WalletError, WalletResult};
pub use signing::{CompiledTransaction, RecoveredSignature, RecoveryIdSet, UnsignedTransaction};
pub use tx::{BroadcastConfig, PendingTransaction};
pub use types::*;

pub use utils::crypto::{keccak256, to_checksum_address};
