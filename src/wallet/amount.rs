//! Decimal amount parsing and formatting
//!
//! Amounts travel as decimal strings in the chain's display unit and are
//! converted to minor units with integer arithmetic only.

use crate::error::{WalletError, WalletResult};
use ethers_core::types::U256;

fn unit(decimals: u8) -> U256 {
    U256::exp10(usize::from(decimals))
}

/// Parse a decimal string such as `"1.5"` into minor units.
///
/// Accepts digits with at most one `.`. Signs, exponents, whitespace inside
/// the number, more fractional digits than `decimals`, and values that do
/// not fit in 256 bits are rejected with `AmountParseError`.
pub fn parse_units(amount: &str, decimals: u8) -> WalletResult<U256> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(WalletError::amount_parse("Amount is empty"));
    }

    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(WalletError::amount_parse(format!("Invalid amount: {}", amount)));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(WalletError::amount_parse(format!("Invalid amount: {}", amount)));
    }
    if fraction.len() > usize::from(decimals) {
        return Err(WalletError::amount_parse(format!(
            "Amount {} has more than {} decimal places",
            amount, decimals
        )));
    }

    let overflow = || WalletError::amount_parse(format!("Amount {} is too large", amount));

    let whole_units = if whole.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(whole).map_err(|_| overflow())?
    };

    let mut padded = fraction.to_string();
    padded.extend(std::iter::repeat('0').take(usize::from(decimals) - fraction.len()));
    let fraction_units = if padded.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(&padded).map_err(|_| overflow())?
    };

    whole_units
        .checked_mul(unit(decimals))
        .and_then(|w| w.checked_add(fraction_units))
        .ok_or_else(overflow)
}

/// Render minor units as a decimal string with trailing zeros trimmed.
pub fn format_units(value: U256, decimals: u8) -> String {
    let unit = unit(decimals);
    let whole = value / unit;
    let fraction = value % unit;

    if fraction.is_zero() {
        return whole.to_string();
    }

    let digits = fraction.to_string();
    let mut padded = "0".repeat(usize::from(decimals) - digits.len());
    padded.push_str(&digits);
    format!("{}.{}", whole, padded.trim_end_matches('0'))
}
