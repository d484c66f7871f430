//! EVM Nonce Tracking
//!
//! Tracks the account's transaction count so the next transaction can be
//! built without a network round-trip. The count only moves forward after a
//! node has accepted a broadcast.

use serde::{Deserialize, Serialize};

/// Latest and pending transaction counts for one account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceTracker {
    /// Transactions included in the latest block
    pub tx_count: Option<u64>,
    /// Transactions including those still in the mempool
    pub pending_tx_count: Option<u64>,
}

impl NonceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nonce for the next transaction, once a count has been loaded
    pub fn next_nonce(&self) -> Option<u64> {
        self.tx_count
    }

    /// Record one accepted broadcast.
    ///
    /// Does nothing while the count is unknown.
    pub fn advance(&mut self) {
        if let Some(count) = self.tx_count.as_mut() {
            *count += 1;
        }
    }

    /// Store counts fetched from the node
    pub fn sync(&mut self, latest: u64, pending: u64) {
        self.tx_count = Some(latest);
        self.pending_tx_count = Some(pending);
    }

    /// Set the count directly, for callers that track it themselves
    pub fn set(&mut self, count: u64) {
        self.tx_count = Some(count);
        self.pending_tx_count = Some(count);
    }

    /// `true` when the mempool holds transactions not yet in a block
    pub fn has_pending_transactions(&self) -> bool {
        self.tx_count != self.pending_tx_count
    }
}
