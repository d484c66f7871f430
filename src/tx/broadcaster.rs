//! Transaction Broadcaster
//!
//! Submits signed transactions to a node. The local nonce counter advances
//! exactly once per accepted submission and never on failure, so a failed
//! broadcast can be retried with the same nonce.

use crate::api::NodeClient;
use crate::error::{ErrorCode, WalletError, WalletResult};
use crate::signing::CompiledTransaction;
use crate::types::TransactionId;
use crate::utils::logging::redact_hash;
use crate::wallet::NonceTracker;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Broadcast configuration
#[derive(Debug, Clone, Copy)]
pub struct BroadcastConfig {
    /// Upper bound on one submission, on top of the HTTP client timeout
    pub timeout: Duration,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
        }
    }
}

pub struct Broadcaster<N> {
    node: Arc<N>,
    config: BroadcastConfig,
}

impl<N: NodeClient> Broadcaster<N> {
    pub fn new(node: Arc<N>, config: BroadcastConfig) -> Self {
        Self { node, config }
    }

    /// Submit `tx` and advance `nonce` on success.
    ///
    /// Failures come back as `BroadcastFailed`; cancellation as `Cancelled`.
    /// In both cases `nonce` is left untouched.
    pub async fn submit(
        &self,
        tx: &CompiledTransaction,
        nonce: &mut NonceTracker,
        cancel: &CancellationToken,
    ) -> WalletResult<TransactionId> {
        let local_hash = tx.tx_hash_hex();
        tracing::debug!(tx_hash = %redact_hash(&local_hash), bytes = tx.raw_tx.len(), "broadcasting transaction");

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(tx_hash = %redact_hash(&local_hash), "broadcast cancelled");
                return Err(WalletError::cancelled("Broadcast cancelled"));
            }
            outcome = tokio::time::timeout(self.config.timeout, self.node.send_raw_transaction(&tx.raw_tx)) => outcome,
        };

        let id = match outcome {
            Ok(Ok(id)) => id,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "broadcast rejected");
                return Err(as_broadcast_failure(e));
            }
            Err(_) => {
                tracing::warn!(timeout_secs = self.config.timeout.as_secs(), "broadcast timed out");
                return Err(WalletError::broadcast_failed("Broadcast timed out"));
            }
        };

        nonce.advance();

        if !id.as_str().eq_ignore_ascii_case(&local_hash) {
            tracing::warn!(
                node_id = %redact_hash(id.as_str()),
                local = %redact_hash(&local_hash),
                "node returned a transaction id that differs from the local hash"
            );
        }
        tracing::info!(tx_id = %redact_hash(id.as_str()), next_nonce = ?nonce.next_nonce(), "transaction broadcast");
        Ok(id)
    }
}

fn as_broadcast_failure(e: WalletError) -> WalletError {
    if e.code == ErrorCode::BroadcastFailed {
        return e;
    }
    let reason = e.details.clone().unwrap_or_else(|| e.message.clone());
    WalletError::broadcast_failed(reason).with_details(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BlockTag;
    use crate::types::Address;
    use ethers_core::types::U256;
    use std::sync::Mutex;

    /// Node that accepts or rejects every submission
    struct SubmitNode {
        accept: bool,
        delay: Duration,
        received: Mutex<Vec<Vec<u8>>>,
    }

    impl SubmitNode {
        fn new(accept: bool) -> Self {
            Self {
                accept,
                delay: Duration::ZERO,
                received: Mutex::new(Vec::new()),
            }
        }
    }

    impl NodeClient for SubmitNode {
        async fn gas_price(&self) -> WalletResult<U256> {
            unreachable!("not used by broadcast tests")
        }

        async fn send_raw_transaction(&self, raw_tx: &[u8]) -> WalletResult<TransactionId> {
            tokio::time::sleep(self.delay).await;
            self.received.lock().unwrap().push(raw_tx.to_vec());
            if self.accept {
                Ok(TransactionId::new(format!("0x{}", hex::encode(crate::utils::keccak256(raw_tx)))))
            } else {
                Err(WalletError::broadcast_failed("nonce too low"))
            }
        }

        async fn transaction_count(&self, _address: &Address, _block: BlockTag) -> WalletResult<u64> {
            unreachable!("not used by broadcast tests")
        }
    }

    fn compiled() -> CompiledTransaction {
        let raw_tx = vec![0xc0];
        CompiledTransaction {
            tx_hash: crate::utils::keccak256(&raw_tx),
            raw_tx,
        }
    }

    fn tracker(count: u64) -> NonceTracker {
        let mut nonce = NonceTracker::new();
        nonce.set(count);
        nonce
    }

    #[tokio::test]
    async fn test_success_advances_nonce_once() {
        let node = Arc::new(SubmitNode::new(true));
        let broadcaster = Broadcaster::new(node.clone(), BroadcastConfig::default());
        let mut nonce = tracker(4);

        let id = broadcaster.submit(&compiled(), &mut nonce, &CancellationToken::new()).await.unwrap();
        assert_eq!(id.as_str(), compiled().tx_hash_hex());
        assert_eq!(nonce.next_nonce(), Some(5));
        assert_eq!(node.received.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_nonce() {
        let broadcaster = Broadcaster::new(Arc::new(SubmitNode::new(false)), BroadcastConfig::default());
        let mut nonce = tracker(4);

        let err = broadcaster.submit(&compiled(), &mut nonce, &CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BroadcastFailed);
        assert_eq!(nonce.next_nonce(), Some(4));
    }

    #[tokio::test]
    async fn test_cancel_keeps_nonce() {
        let mut node = SubmitNode::new(true);
        node.delay = Duration::from_secs(30);
        let node = Arc::new(node);
        let broadcaster = Broadcaster::new(node.clone(), BroadcastConfig::default());
        let mut nonce = tracker(4);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = broadcaster.submit(&compiled(), &mut nonce, &cancel).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Cancelled);
        assert_eq!(nonce.next_nonce(), Some(4));
        assert!(node.received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_timeout_is_broadcast_failure() {
        let mut node = SubmitNode::new(true);
        node.delay = Duration::from_secs(60);
        let broadcaster = Broadcaster::new(
            Arc::new(node),
            BroadcastConfig { timeout: Duration::from_millis(50) },
        );
        let mut nonce = tracker(0);

        let err = broadcaster.submit(&compiled(), &mut nonce, &CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BroadcastFailed);
        assert_eq!(nonce.next_nonce(), Some(0));
    }

    #[test]
    fn test_network_errors_become_broadcast_failures() {
        let err = as_broadcast_failure(WalletError::network("connection reset"));
        assert_eq!(err.code, ErrorCode::BroadcastFailed);
        assert_eq!(err.message, "connection reset");
    }
}
