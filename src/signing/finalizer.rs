//! Signature finalization
//!
//! Cards return a bare 64-byte `r‖s` with no recovery id, and may return
//! either of the two malleable `s` values. Before the signature can go on
//! the wire it is normalized to low-S, checked against the wallet's public
//! key, and paired with the recovery id that reproduces that key.

use crate::crypto::curves::{self, CurveType, MAX_RECOVERY_CANDIDATES};
use crate::error::{WalletError, WalletResult};
use crate::types::{PublicKey, RawSignature, SigningHash};
use crate::utils::logging::redact_hash;
use serde::{Deserialize, Serialize};

/// Recovery ids a chain accepts, as a contiguous range of `v` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryIdSet {
    /// `v` for recovery id 0
    pub base: u8,
    /// Number of candidates, capped at [`MAX_RECOVERY_CANDIDATES`]
    pub count: u8,
}

impl RecoveryIdSet {
    /// `v ∈ {27, 28, 29, 30}`
    pub const ETHEREUM: Self = Self { base: 27, count: MAX_RECOVERY_CANDIDATES };

    /// `(v, recovery_id)` pairs in trial order
    pub fn candidates(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        (0..self.count.min(MAX_RECOVERY_CANDIDATES)).map(move |id| (self.base + id, id))
    }
}

/// Low-S signature paired with its recovery id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveredSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// Chain-independent `v` from the recovery-id set (27..=30 on EVM)
    pub v: u8,
    /// `v - base`, the raw recovery id
    pub recovery_id: u8,
}

/// Normalize, verify and recover a card signature.
///
/// Trial recovery is bounded by the candidate set size (at most
/// [`MAX_RECOVERY_CANDIDATES`]), so it is O(k) with k = 4.
pub fn finalize(
    curve: CurveType,
    recovery_ids: RecoveryIdSet,
    raw: &RawSignature,
    hash: &SigningHash,
    public_key: &PublicKey,
) -> WalletResult<RecoveredSignature> {
    let expected = public_key.to_sec1_uncompressed()?;
    let order = curves::curve_order(curve)?;

    let r = raw.r();
    let (s, flipped) = curves::normalize_low_s(&order, &raw.s())?;
    if flipped {
        tracing::debug!(hash = %redact_hash(&hash.to_hex()), "normalized high-S signature");
    }

    if !curves::verify_prehash(curve, &expected, hash.as_bytes(), &r, &s)? {
        return Err(WalletError::verification_failed(
            "Signature does not verify against the wallet public key",
        ));
    }

    for (v, recovery_id) in recovery_ids.candidates() {
        match curves::recover_prehash(curve, hash.as_bytes(), &r, &s, recovery_id) {
            Ok(recovered) if recovered == expected => {
                tracing::debug!(v, curve = %curve, "recovery id found");
                return Ok(RecoveredSignature { r, s, v, recovery_id });
            }
            Ok(_) => {}
            Err(e) => tracing::trace!(v, error = %e, "recovery candidate rejected"),
        }
    }

    Err(WalletError::recovery_id_not_found(format!(
        "No recovery id in {}..={} reproduces the public key",
        recovery_ids.base,
        recovery_ids.base.saturating_add(recovery_ids.count.saturating_sub(1))
    )))
}
