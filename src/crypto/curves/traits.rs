//! Elliptic Curve Traits
//!
//! Defines the common interface for ECDSA curves used by card wallets.

use super::CurveError;

/// Upper bound on recovery ids for a prime-order ECDSA curve.
///
/// Ids 0 and 1 select the parity of R.y; ids 2 and 3 additionally mark an
/// R.x that overflowed the group order.
pub const MAX_RECOVERY_CANDIDATES: u8 = 4;

/// ECDSA verification and key recovery over externally computed digests
pub trait EcdsaCurve {
    /// Group order n, big-endian
    const ORDER: [u8; 32];

    /// Check that an uncompressed SEC1 key is a point on this curve
    fn check_public_key(public_key: &[u8; 65]) -> Result<(), CurveError>;

    /// Verify `(r, s)` against an uncompressed SEC1 public key.
    ///
    /// Returns `Ok(false)` for a well-formed signature that does not verify.
    fn verify_prehash(
        public_key: &[u8; 65],
        hash: &[u8; 32],
        r: &[u8; 32],
        s: &[u8; 32],
    ) -> Result<bool, CurveError>;

    /// Recover the uncompressed SEC1 public key for `recovery_id`
    fn recover_prehash(
        hash: &[u8; 32],
        r: &[u8; 32],
        s: &[u8; 32],
        recovery_id: u8,
    ) -> Result<[u8; 65], CurveError>;
}

/// Concatenate `r‖s` into the 64-byte compact form
pub(crate) fn compact_signature(r: &[u8; 32], s: &[u8; 32]) -> [u8; 64] {
    let mut out = [0u8; 64];
    out[..32].copy_from_slice(r);
    out[32..].copy_from_slice(s);
    out
}
