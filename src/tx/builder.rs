//! Transaction Builder
//!
//! Turns user-entered amounts into an unsigned transaction and its signing
//! hash. Amounts are decimal strings; nothing on this path touches floating
//! point.

use crate::chain::ChainRule;
use crate::error::{WalletError, WalletResult};
use crate::signing::UnsignedTransaction;
use crate::types::{Address, SigningHash};
use crate::utils::logging::redact_hash;
use crate::wallet::parse_units;
use ethers_core::types::U256;
use serde::Serialize;

/// Unsigned transaction together with the hash the card must sign
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingTransaction {
    pub unsigned: UnsignedTransaction,
    pub hash: SigningHash,
}

/// Build an unsigned value transfer.
///
/// `amount` and `fee` are in display units. With `include_fee` the fee is
/// taken out of the amount ("send max"), so the recipient receives
/// `amount - fee`. The gas price is `fee / gas_limit`, rounded down.
pub fn build_unsigned<R: ChainRule + ?Sized>(
    rule: &R,
    amount: &str,
    fee: &str,
    destination: &str,
    nonce: u64,
    include_fee: bool,
) -> WalletResult<PendingTransaction> {
    let decimals = rule.decimals();
    let amount_units = parse_units(amount, decimals)?;
    let fee_units = parse_units(fee, decimals)?;

    let destination: Address = destination.parse()?;

    let value = if include_fee {
        amount_units.checked_sub(fee_units).ok_or_else(|| {
            WalletError::invalid_amount(format!("Fee {} exceeds amount {}", fee, amount))
        })?
    } else {
        amount_units
    };

    let gas_limit = rule.gas_limit();
    let unsigned = UnsignedTransaction {
        nonce,
        destination,
        value,
        gas_limit,
        gas_price: fee_units / U256::from(gas_limit),
        chain_id: rule.chain_id(),
    };
    let hash = rule.signing_hash(&unsigned);

    tracing::debug!(nonce, chain_id = unsigned.chain_id, hash = %redact_hash(&hash.to_hex()), "built unsigned transaction");
    Ok(PendingTransaction { unsigned, hash })
}

/// The single in-flight unsigned transaction of an engine.
///
/// A new build replaces whatever is stored (last writer wins). The slot
/// also remembers the hash of the signed form last finalized from it, so a
/// broadcast of exactly those bytes can retire it.
#[derive(Debug, Default)]
pub struct TransactionSlot {
    current: Option<PendingTransaction>,
    finalized: Option<[u8; 32]>,
}

impl TransactionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `pending`, returning the transaction it replaced
    pub fn store(&mut self, pending: PendingTransaction) -> Option<PendingTransaction> {
        let previous = self.current.replace(pending);
        self.finalized = None;
        if let Some(prev) = &previous {
            tracing::debug!(
                replaced = %redact_hash(&prev.hash.to_hex()),
                "overwriting unsigned transaction"
            );
        }
        previous
    }

    pub fn current(&self) -> Option<&PendingTransaction> {
        self.current.as_ref()
    }

    /// Record the hash of the signed transaction compiled from the
    /// current entry
    pub fn mark_finalized(&mut self, tx_hash: [u8; 32]) {
        if self.current.is_some() {
            self.finalized = Some(tx_hash);
        }
    }

    /// Clear the slot if `tx_hash` is the signed form of its entry
    pub fn clear_if_finalized(&mut self, tx_hash: &[u8; 32]) -> bool {
        if self.finalized.as_ref() == Some(tx_hash) {
            self.clear();
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.finalized = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::EvmChainRule;
    use crate::error::ErrorCode;
    use crate::signing::legacy_signing_hash;

    const DEST: &str = "0x3535353535353535353535353535353535353535";

    #[test]
    fn test_include_fee_deducts_exactly() {
        let rule = EvmChainRule::ethereum();
        let pending = build_unsigned(&rule, "1.5", "0.001", DEST, 0, true).unwrap();
        assert_eq!(pending.unsigned.value, U256::from_dec_str("1499000000000000000").unwrap());
    }

    #[test]
    fn test_fee_added_on_top() {
        let rule = EvmChainRule::ethereum();
        let pending = build_unsigned(&rule, "1.5", "0.001", DEST, 0, false).unwrap();
        assert_eq!(pending.unsigned.value, U256::from_dec_str("1500000000000000000").unwrap());
    }

    #[test]
    fn test_gas_price_from_fee() {
        let rule = EvmChainRule::ethereum();
        let pending = build_unsigned(&rule, "1", "0.00042", DEST, 9, false).unwrap();
        assert_eq!(pending.unsigned.gas_price, U256::from(20_000_000_000u64));
        assert_eq!(pending.unsigned.gas_limit, 21_000);
        assert_eq!(pending.unsigned.chain_id, 1);
        assert_eq!(pending.hash, legacy_signing_hash(&pending.unsigned));
    }

    #[test]
    fn test_eip155_example_hash() {
        let rule = EvmChainRule::ethereum();
        let pending = build_unsigned(&rule, "1", "0.00042", DEST, 9, false).unwrap();
        assert_eq!(
            pending.hash.to_hex(),
            "0xdaf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        );
    }

    #[test]
    fn test_malformed_amount() {
        let rule = EvmChainRule::ethereum();
        let err = build_unsigned(&rule, "1.2.3", "0.001", DEST, 0, false).unwrap_err();
        assert_eq!(err.code, ErrorCode::AmountParseError);
        let err = build_unsigned(&rule, "1", "fast", DEST, 0, false).unwrap_err();
        assert_eq!(err.code, ErrorCode::AmountParseError);
    }

    #[test]
    fn test_fee_exceeds_amount() {
        let rule = EvmChainRule::ethereum();
        let err = build_unsigned(&rule, "0.001", "0.01", DEST, 0, true).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidAmount);
    }

    #[test]
    fn test_invalid_destination() {
        let rule = EvmChainRule::ethereum();
        let err = build_unsigned(&rule, "1", "0.001", "0x1234", 0, false).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidAddress);
    }

    #[test]
    fn test_slot_last_writer_wins() {
        let rule = EvmChainRule::ethereum();
        let first = build_unsigned(&rule, "1", "0.001", DEST, 0, false).unwrap();
        let second = build_unsigned(&rule, "2", "0.001", DEST, 0, false).unwrap();

        let mut slot = TransactionSlot::new();
        assert!(slot.store(first.clone()).is_none());
        assert_eq!(slot.store(second.clone()), Some(first));
        assert_eq!(slot.current(), Some(&second));
        slot.clear();
        assert!(slot.current().is_none());
    }

    #[test]
    fn test_slot_retired_only_by_its_signed_form() {
        let rule = EvmChainRule::ethereum();
        let first = build_unsigned(&rule, "1", "0.001", DEST, 0, false).unwrap();
        let second = build_unsigned(&rule, "2", "0.001", DEST, 0, false).unwrap();

        let mut slot = TransactionSlot::new();
        slot.store(first);
        slot.mark_finalized([0xaa; 32]);
        assert!(!slot.clear_if_finalized(&[0xbb; 32]));

        // A rebuild forgets the earlier signed form
        slot.store(second.clone());
        assert!(!slot.clear_if_finalized(&[0xaa; 32]));
        assert_eq!(slot.current(), Some(&second));

        slot.mark_finalized([0xcc; 32]);
        assert!(slot.clear_if_finalized(&[0xcc; 32]));
        assert!(slot.current().is_none());
    }
}
