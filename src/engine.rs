//! Wallet engine
//!
//! One engine per (card wallet, chain). It owns the derived address, the fee
//! estimator, the broadcaster, and the only mutable state of a send: the
//! current unsigned transaction and the nonce counter. Both live behind a
//! single async mutex, and `send` holds it from signature finalization to
//! the end of the broadcast.

use crate::api::{BlockTag, NodeClient};
use crate::chain::ChainRule;
use crate::crypto::curves;
use crate::error::{WalletError, WalletResult};
use crate::fees::FeeEstimator;
use crate::signing::{self, CompiledTransaction};
use crate::tx::{self, BroadcastConfig, Broadcaster, PendingTransaction, TransactionSlot};
use crate::types::{Address, FeeQuote, PublicKey, RawSignature, TransactionId};
use crate::utils::logging::redact_address;
use crate::wallet::NonceTracker;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Tunables for a [`WalletEngine`]
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Maximum age of a cached fee quote; `None` keeps it until invalidated
    pub fee_cache_ttl: Option<Duration>,
    pub broadcast: BroadcastConfig,
}

/// Result of a completed send
#[derive(Debug, Clone, Serialize)]
pub struct SendReceipt {
    pub tx_id: TransactionId,
    pub transaction: CompiledTransaction,
}

#[derive(Debug, Default)]
struct EngineState {
    slot: TransactionSlot,
    nonce: NonceTracker,
}

pub struct WalletEngine<R, N> {
    rule: R,
    public_key: PublicKey,
    address: Address,
    node: Arc<N>,
    fees: FeeEstimator<N>,
    broadcaster: Broadcaster<N>,
    state: Mutex<EngineState>,
}

impl<R: ChainRule, N: NodeClient> WalletEngine<R, N> {
    pub fn new(rule: R, public_key: PublicKey, node: Arc<N>) -> WalletResult<Self> {
        Self::with_options(rule, public_key, node, EngineOptions::default())
    }

    /// Create an engine for `public_key` on `rule`'s chain.
    ///
    /// Fails with `InvalidPublicKeyFormat` when the key is malformed or not
    /// a point on the rule's curve.
    pub fn with_options(rule: R, public_key: PublicKey, node: Arc<N>, options: EngineOptions) -> WalletResult<Self> {
        let sec1 = public_key.to_sec1_uncompressed()?;
        curves::check_public_key(rule.curve(), &sec1)?;
        let address = rule.derive_address(&public_key)?;

        let fees = FeeEstimator::new(node.clone(), rule.gas_limit(), rule.decimals())
            .with_max_age(options.fee_cache_ttl);
        let broadcaster = Broadcaster::new(node.clone(), options.broadcast);

        tracing::info!(
            chain = %rule.chain(),
            curve = %rule.curve(),
            address = %redact_address(&address.to_string()),
            "wallet engine created"
        );

        Ok(Self {
            rule,
            public_key,
            address,
            node,
            fees,
            broadcaster,
            state: Mutex::new(EngineState::default()),
        })
    }

    // MARK: - Wallet info

    pub fn rule(&self) -> &R {
        &self.rule
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// EIP-55 rendering of the address
    pub fn checksum_address(&self) -> String {
        self.address.to_checksum()
    }

    pub fn explorer_link(&self) -> String {
        self.rule.explorer_link(&self.address)
    }

    pub fn qr_payload(&self) -> String {
        self.rule.qr_payload(&self.address)
    }

    pub fn symbol(&self) -> &'static str {
        self.rule.chain().symbol()
    }

    pub fn decimals(&self) -> u8 {
        self.rule.decimals()
    }

    pub fn display_name(&self) -> &'static str {
        self.rule.chain().display_name()
    }

    // MARK: - Fees

    pub async fn estimate_fee(
        &self,
        destination: &str,
        amount: &str,
        cancel: &CancellationToken,
    ) -> WalletResult<FeeQuote> {
        let destination: Address = destination.parse()?;
        self.fees.estimate_fee(&destination, amount, cancel).await
    }

    pub async fn invalidate_fee_cache(&self) {
        self.fees.invalidate().await;
    }

    // MARK: - Building

    /// Build with the tracked nonce.
    ///
    /// Fails with `InvalidTransaction` until the transaction count has been
    /// synced or set.
    pub async fn build_unsigned(
        &self,
        amount: &str,
        fee: &str,
        destination: &str,
        include_fee: bool,
    ) -> WalletResult<PendingTransaction> {
        let mut state = self.state.lock().await;
        let nonce = state.nonce.next_nonce().ok_or_else(|| {
            WalletError::invalid_transaction("Transaction count not loaded; sync it before building")
        })?;
        let pending = tx::build_unsigned(&self.rule, amount, fee, destination, nonce, include_fee)?;
        state.slot.store(pending.clone());
        Ok(pending)
    }

    pub async fn build_unsigned_with_nonce(
        &self,
        amount: &str,
        fee: &str,
        destination: &str,
        nonce: u64,
        include_fee: bool,
    ) -> WalletResult<PendingTransaction> {
        let pending = tx::build_unsigned(&self.rule, amount, fee, destination, nonce, include_fee)?;
        self.state.lock().await.slot.store(pending.clone());
        Ok(pending)
    }

    pub async fn current_transaction(&self) -> Option<PendingTransaction> {
        self.state.lock().await.slot.current().cloned()
    }

    // MARK: - Signing

    /// Attach the card's signature to the current transaction
    pub async fn finalize(&self, raw: &RawSignature) -> WalletResult<CompiledTransaction> {
        let mut state = self.state.lock().await;
        let transaction = {
            let pending = current(&state.slot)?;
            self.compile(pending, raw)?
        };
        state.slot.mark_finalized(transaction.tx_hash);
        Ok(transaction)
    }

    fn compile(&self, pending: &PendingTransaction, raw: &RawSignature) -> WalletResult<CompiledTransaction> {
        let signature = signing::finalize(
            self.rule.curve(),
            self.rule.recovery_ids(),
            raw,
            &pending.hash,
            &self.public_key,
        )?;
        Ok(self.rule.encode_signed(&pending.unsigned, &signature))
    }

    // MARK: - Broadcasting

    /// Broadcast an already signed transaction.
    ///
    /// If it is the output of [`finalize`](Self::finalize) for the current
    /// unsigned transaction, the slot is cleared once the node accepts it.
    pub async fn submit(
        &self,
        transaction: &CompiledTransaction,
        cancel: &CancellationToken,
    ) -> WalletResult<TransactionId> {
        let mut state = self.state.lock().await;
        let tx_id = self.broadcaster.submit(transaction, &mut state.nonce, cancel).await?;
        if state.slot.clear_if_finalized(&transaction.tx_hash) {
            tracing::debug!(tx_id = %tx_id, "finalized transaction broadcast; slot cleared");
        }
        Ok(tx_id)
    }

    /// Finalize, encode and broadcast the current transaction.
    ///
    /// The slot is cleared only when the node accepts the transaction.
    pub async fn send(&self, raw: &RawSignature, cancel: &CancellationToken) -> WalletResult<SendReceipt> {
        let mut state = self.state.lock().await;
        let transaction = {
            let pending = current(&state.slot)?;
            self.compile(pending, raw)?
        };

        let tx_id = self.broadcaster.submit(&transaction, &mut state.nonce, cancel).await?;
        state.slot.clear();

        Ok(SendReceipt { tx_id, transaction })
    }

    // MARK: - Nonce

    /// Load latest and pending transaction counts from the node
    pub async fn sync_transaction_count(&self, cancel: &CancellationToken) -> WalletResult<NonceTracker> {
        let (latest, pending) = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(WalletError::cancelled("Transaction count query cancelled"));
            }
            counts = async {
                tokio::try_join!(
                    self.node.transaction_count(&self.address, BlockTag::Latest),
                    self.node.transaction_count(&self.address, BlockTag::Pending),
                )
            } => counts?,
        };

        let mut state = self.state.lock().await;
        state.nonce.sync(latest, pending);
        tracing::debug!(latest, pending, "transaction count synced");
        Ok(state.nonce)
    }

    pub async fn set_transaction_count(&self, count: u64) {
        self.state.lock().await.nonce.set(count);
    }

    pub async fn transaction_count(&self) -> Option<u64> {
        self.state.lock().await.nonce.next_nonce()
    }

    pub async fn has_pending_transactions(&self) -> bool {
        self.state.lock().await.nonce.has_pending_transactions()
    }
}

fn current(slot: &TransactionSlot) -> WalletResult<&PendingTransaction> {
    slot.current()
        .ok_or_else(|| WalletError::invalid_transaction("No unsigned transaction has been built"))
}
