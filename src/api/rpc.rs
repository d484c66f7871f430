//! Ethereum JSON-RPC client

use super::{BlockTag, NodeClient};
use crate::error::{ErrorCode, WalletError, WalletResult};
use crate::types::{Address, TransactionId};
use crate::utils::network_config::require_valid_endpoint;
use ethers_core::types::U256;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use url::Url;

#[derive(Serialize)]
struct RpcRequest<'a, P: Serialize> {
    jsonrpc: &'static str,
    method: &'a str,
    params: P,
    id: u64,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// JSON-RPC client for one node endpoint
#[derive(Debug)]
pub struct JsonRpcClient {
    client: Client,
    endpoint: Url,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Client for `endpoint`.
    ///
    /// The URL must be https, or http on a loopback host.
    pub fn new(endpoint: &str, timeout: Duration) -> WalletResult<Self> {
        let endpoint = require_valid_endpoint(endpoint)?;
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent("card-wallet-core/0.1")
            .build()
            .map_err(|e| WalletError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn call<P, T>(&self, method: &str, params: P) -> WalletResult<T>
    where
        P: Serialize + Send,
        T: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(method, id, "rpc request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&RpcRequest {
                jsonrpc: "2.0",
                method,
                params,
                id,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WalletError::network(format!("{} returned HTTP {}", method, status)));
        }

        let body: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| WalletError::new(ErrorCode::JsonError, format!("Invalid {} response", method)).with_details(e.to_string()))?;

        if let Some(err) = body.error {
            return Err(WalletError::network(format!("{} failed", method))
                .with_details(format!("{} (code {})", err.message, err.code)));
        }

        body.result
            .ok_or_else(|| WalletError::new(ErrorCode::JsonError, format!("No result in {} response", method)))
    }
}

impl NodeClient for JsonRpcClient {
    async fn gas_price(&self) -> WalletResult<U256> {
        let hex: String = self.call("eth_gasPrice", Vec::<String>::new()).await?;
        parse_quantity(&hex)
    }

    async fn send_raw_transaction(&self, raw_tx: &[u8]) -> WalletResult<TransactionId> {
        let payload = format!("0x{}", hex::encode(raw_tx));
        let hash: String = self
            .call("eth_sendRawTransaction", [payload])
            .await
            .map_err(|e| {
                let reason = e.details.clone().unwrap_or_else(|| e.message.clone());
                WalletError::broadcast_failed(reason)
            })?;
        Ok(TransactionId::new(hash))
    }

    async fn transaction_count(&self, address: &Address, block: BlockTag) -> WalletResult<u64> {
        let hex: String = self
            .call("eth_getTransactionCount", (address.to_string(), block.as_str()))
            .await?;
        let count = parse_quantity(&hex)?;
        if count > U256::from(u64::MAX) {
            return Err(WalletError::new(ErrorCode::JsonError, "Transaction count out of range"));
        }
        Ok(count.as_u64())
    }
}

/// Parse a JSON-RPC hex quantity such as `"0x4a817c800"`
pub(crate) fn parse_quantity(hex: &str) -> WalletResult<U256> {
    let digits = hex
        .strip_prefix("0x")
        .ok_or_else(|| WalletError::new(ErrorCode::HexError, format!("Quantity {} lacks 0x prefix", hex)))?;
    if digits.is_empty() || digits.len() > 64 {
        return Err(WalletError::new(ErrorCode::HexError, format!("Invalid quantity {}", hex)));
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| WalletError::new(ErrorCode::HexError, format!("Invalid quantity {}", hex)).with_details(e.to_string()))
}
