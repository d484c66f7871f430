//! Low-S normalization.
//!
//! For any valid ECDSA signature `(r, s)`, `(r, n - s)` is valid as well.
//! Chains that forbid this malleability (EIP-2, BIP-62) only accept the
//! variant with `s <= n / 2`.

use super::CurveError;
use ethers_core::types::U256;

fn to_u256(bytes: &[u8; 32]) -> U256 {
    U256::from_big_endian(bytes)
}

fn half(n: U256) -> U256 {
    n / U256::from(2u64)
}

fn to_bytes(value: U256) -> [u8; 32] {
    let mut out = [0u8; 32];
    value.to_big_endian(&mut out);
    out
}

/// `true` if `s <= order / 2`
pub fn is_low_s(order: &[u8; 32], s: &[u8; 32]) -> bool {
    to_u256(s) <= half(to_u256(order))
}

/// Rewrite `s` into its low half.
///
/// Returns the canonical `s` and whether it was flipped. `s` must be a
/// non-zero scalar below the order.
pub fn normalize_low_s(order: &[u8; 32], s: &[u8; 32]) -> Result<([u8; 32], bool), CurveError> {
    let n = to_u256(order);
    let value = to_u256(s);

    if value.is_zero() {
        return Err(CurveError::InvalidSignature("s is zero".to_string()));
    }
    if value >= n {
        return Err(CurveError::InvalidSignature("s is not below the curve order".to_string()));
    }

    if value > half(n) {
        Ok((to_bytes(n - value), true))
    } else {
        Ok((*s, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::curves::{EcdsaCurve, Secp256k1Curve};

    fn half_bytes(order: &[u8; 32]) -> [u8; 32] {
        to_bytes(half(to_u256(order)))
    }

    #[test]
    fn test_low_s_unchanged() {
        let order = Secp256k1Curve::ORDER;
        let s = [0x01; 32];
        assert_eq!(normalize_low_s(&order, &s).unwrap(), (s, false));

        // n/2 itself is already canonical
        let boundary = half_bytes(&order);
        assert_eq!(normalize_low_s(&order, &boundary).unwrap(), (boundary, false));
    }

    #[test]
    fn test_high_s_flipped() {
        let order = Secp256k1Curve::ORDER;
        let n = to_u256(&order);
        let high = to_bytes(n - U256::from(5u64));
        let (normalized, flipped) = normalize_low_s(&order, &high).unwrap();
        assert!(flipped);
        assert_eq!(to_u256(&normalized), U256::from(5u64));
        assert!(is_low_s(&order, &normalized));

        let just_above = to_bytes(half(n) + U256::one());
        let (normalized, flipped) = normalize_low_s(&order, &just_above).unwrap();
        assert!(flipped);
        assert!(is_low_s(&order, &normalized));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let order = Secp256k1Curve::ORDER;
        assert!(normalize_low_s(&order, &[0u8; 32]).is_err());
        assert!(normalize_low_s(&order, &order).is_err());
        assert!(normalize_low_s(&order, &[0xff; 32]).is_err());
    }

    #[test]
    fn test_secp256k1_half_order_constant() {
        // EIP-2 bound on s
        let expected = "7fffffffffffffffffffffffffffffff5d576e7357a4501ddfe92f46681b20a0";
        assert_eq!(hex::encode(half_bytes(&Secp256k1Curve::ORDER)), expected);
    }
}
