//! Node API
//!
//! The signing core talks to the network through [`NodeClient`]: one call
//! for the gas price, one to submit raw bytes, one for transaction counts.
//! [`JsonRpcClient`] implements it over Ethereum JSON-RPC.

mod rpc;

pub use rpc::JsonRpcClient;

use crate::error::WalletResult;
use crate::types::{Address, TransactionId};
use ethers_core::types::U256;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Block selector for state queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockTag {
    Latest,
    Pending,
}

impl BlockTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Pending => "pending",
        }
    }
}

/// Network boundary of the signing core
pub trait NodeClient: Send + Sync {
    /// Current gas price in minor units
    fn gas_price(&self) -> impl Future<Output = WalletResult<U256>> + Send;

    /// Submit signed transaction bytes; returns the node's transaction id
    fn send_raw_transaction(&self, raw_tx: &[u8]) -> impl Future<Output = WalletResult<TransactionId>> + Send;

    /// Number of transactions sent from `address` as of `block`
    fn transaction_count(
        &self,
        address: &Address,
        block: BlockTag,
    ) -> impl Future<Output = WalletResult<u64>> + Send;
}
