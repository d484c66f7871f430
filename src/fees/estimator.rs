//! Fee Estimator
//!
//! Queries the node gas price and derives three fee tiers for a fixed gas
//! budget. The quote is cached until the caller invalidates it or, when
//! configured, until it reaches a maximum age.

use crate::api::NodeClient;
use crate::error::{WalletError, WalletResult};
use crate::types::{Address, FeeQuote};
use crate::utils::logging::redact_address;
use crate::wallet::format_units;
use chrono::Utc;
use ethers_core::types::U256;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Tier multipliers as (numerator, denominator)
const MIN_MULTIPLIER: (u64, u64) = (1, 1);
const NORMAL_MULTIPLIER: (u64, u64) = (12, 10);
const MAX_MULTIPLIER: (u64, u64) = (15, 10);

struct CachedQuote {
    quote: FeeQuote,
    stored_at: Instant,
}

pub struct FeeEstimator<N> {
    node: Arc<N>,
    gas_limit: u64,
    decimals: u8,
    max_age: Option<Duration>,
    cache: Mutex<Option<CachedQuote>>,
}

impl<N: NodeClient> FeeEstimator<N> {
    /// Estimator whose cached quote never expires on its own
    pub fn new(node: Arc<N>, gas_limit: u64, decimals: u8) -> Self {
        Self {
            node,
            gas_limit,
            decimals,
            max_age: None,
            cache: Mutex::new(None),
        }
    }

    /// Expire cached quotes after `max_age`
    pub fn with_max_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_age = max_age;
        self
    }

    /// Fee tiers for sending `amount` to `destination`.
    ///
    /// A cached quote is returned without network I/O. A cancelled query
    /// returns `Cancelled` and leaves the cache as it was.
    pub async fn estimate_fee(
        &self,
        destination: &Address,
        amount: &str,
        cancel: &CancellationToken,
    ) -> WalletResult<FeeQuote> {
        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.as_ref() {
            let fresh = self.max_age.map_or(true, |age| cached.stored_at.elapsed() < age);
            if fresh {
                tracing::debug!("fee quote served from cache");
                return Ok(cached.quote.clone());
            }
            tracing::debug!("cached fee quote expired");
        }

        tracing::debug!(
            destination = %redact_address(&destination.to_string()),
            amount,
            "querying gas price"
        );

        let gas_price = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(WalletError::cancelled("Fee query cancelled"));
            }
            result = self.node.gas_price() => result.map_err(|e| {
                WalletError::fee_query_failed("Gas price query failed").with_details(e.to_string())
            })?,
        };

        let quote = fee_tiers(gas_price, self.gas_limit, self.decimals)?;
        tracing::info!(gas_price = %gas_price, normal = %quote.normal, "fee quote updated");

        *cache = Some(CachedQuote {
            quote: quote.clone(),
            stored_at: Instant::now(),
        });
        Ok(quote)
    }

    /// Drop the cached quote so the next estimate queries the node
    pub async fn invalidate(&self) {
        if self.cache.lock().await.take().is_some() {
            tracing::debug!("fee cache invalidated");
        }
    }

    /// The cached quote, if any, regardless of age
    pub async fn cached(&self) -> Option<FeeQuote> {
        self.cache.lock().await.as_ref().map(|c| c.quote.clone())
    }
}

fn tier(gas_price: U256, (num, den): (u64, u64), gas_limit: u64) -> WalletResult<U256> {
    gas_price
        .checked_mul(U256::from(num))
        .map(|scaled| scaled / U256::from(den))
        .and_then(|price| price.checked_mul(U256::from(gas_limit)))
        .ok_or_else(|| WalletError::fee_query_failed(format!("Gas price {} out of range", gas_price)))
}

/// Compute min/normal/max tiers for `gas_price`.
///
/// Each tier is `gas_price × multiplier × gas_limit` in integer arithmetic,
/// scaling the price before multiplying by the gas limit.
pub fn fee_tiers(gas_price: U256, gas_limit: u64, decimals: u8) -> WalletResult<FeeQuote> {
    let min_wei = tier(gas_price, MIN_MULTIPLIER, gas_limit)?;
    let normal_wei = tier(gas_price, NORMAL_MULTIPLIER, gas_limit)?;
    let max_wei = tier(gas_price, MAX_MULTIPLIER, gas_limit)?;

    Ok(FeeQuote {
        min: format_units(min_wei, decimals),
        normal: format_units(normal_wei, decimals),
        max: format_units(max_wei, decimals),
        min_wei,
        normal_wei,
        max_wei,
        gas_price,
        gas_limit,
        fetched_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BlockTag;
    use crate::error::ErrorCode;
    use crate::types::TransactionId;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct GasNode {
        gas_price: Option<U256>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl GasNode {
        fn new(gas_price: Option<u64>) -> Self {
            Self {
                gas_price: gas_price.map(U256::from),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl NodeClient for GasNode {
        async fn gas_price(&self) -> WalletResult<U256> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.gas_price.ok_or_else(|| WalletError::network("node unreachable"))
        }

        async fn send_raw_transaction(&self, _raw_tx: &[u8]) -> WalletResult<TransactionId> {
            unreachable!("not used by fee tests")
        }

        async fn transaction_count(&self, _address: &Address, _block: BlockTag) -> WalletResult<u64> {
            unreachable!("not used by fee tests")
        }
    }

    fn destination() -> Address {
        "0x3535353535353535353535353535353535353535".parse().unwrap()
    }

    #[test]
    fn test_fee_tiers_20_gwei() {
        let quote = fee_tiers(U256::from(20_000_000_000u64), 21_000, 18).unwrap();
        assert_eq!(quote.min, "0.00042");
        assert_eq!(quote.normal, "0.000504");
        assert_eq!(quote.max, "0.00063");
        assert_eq!(quote.min_wei, U256::from(420_000_000_000_000u64));
    }

    #[test]
    fn test_fee_tiers_truncate_price_first() {
        // 7 wei × 1.2 = 8.4, truncated to 8 before the gas limit applies
        let quote = fee_tiers(U256::from(7u64), 21_000, 18).unwrap();
        assert_eq!(quote.normal_wei, U256::from(8u64 * 21_000));
        assert_eq!(quote.max_wei, U256::from(10u64 * 21_000));
    }

    #[test]
    fn test_fee_tiers_overflow() {
        let err = fee_tiers(U256::MAX, 21_000, 18).unwrap_err();
        assert_eq!(err.code, ErrorCode::FeeQueryFailed);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let node = Arc::new(GasNode::new(Some(20_000_000_000)));
        let estimator = FeeEstimator::new(node.clone(), 21_000, 18);
        let cancel = CancellationToken::new();

        let first = estimator.estimate_fee(&destination(), "1", &cancel).await.unwrap();
        let second = estimator.estimate_fee(&destination(), "2", &cancel).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(node.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_query() {
        let node = Arc::new(GasNode::new(Some(1_000_000_000)));
        let estimator = FeeEstimator::new(node.clone(), 21_000, 18);
        let cancel = CancellationToken::new();

        estimator.estimate_fee(&destination(), "1", &cancel).await.unwrap();
        estimator.invalidate().await;
        assert!(estimator.cached().await.is_none());
        estimator.estimate_fee(&destination(), "1", &cancel).await.unwrap();
        assert_eq!(node.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_max_age_expires_quote() {
        let node = Arc::new(GasNode::new(Some(1_000_000_000)));
        let estimator = FeeEstimator::new(node.clone(), 21_000, 18).with_max_age(Some(Duration::ZERO));
        let cancel = CancellationToken::new();

        estimator.estimate_fee(&destination(), "1", &cancel).await.unwrap();
        estimator.estimate_fee(&destination(), "1", &cancel).await.unwrap();
        assert_eq!(node.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_node_failure() {
        let estimator = FeeEstimator::new(Arc::new(GasNode::new(None)), 21_000, 18);
        let err = estimator
            .estimate_fee(&destination(), "1", &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::FeeQueryFailed);
        assert!(estimator.cached().await.is_none());
    }

    #[tokio::test]
    async fn test_cancel_leaves_cache_empty() {
        let mut node = GasNode::new(Some(1_000_000_000));
        node.delay = Duration::from_secs(30);
        let estimator = FeeEstimator::new(Arc::new(node), 21_000, 18);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = estimator.estimate_fee(&destination(), "1", &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(estimator.cached().await.is_none());
    }
}
