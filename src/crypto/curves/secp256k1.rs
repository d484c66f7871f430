//! secp256k1 Curve Implementation
//!
//! Used by: Ethereum, BNB Chain, Polygon and the other EVM networks.
//!
//! Verification goes through libsecp256k1, which only accepts low-S
//! signatures, so callers normalize before verifying.

use super::traits::compact_signature;
use super::{CurveError, EcdsaCurve};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId, Signature};
use secp256k1::{constants, Message, PublicKey, Secp256k1};

/// secp256k1 curve implementation
pub struct Secp256k1Curve;

impl EcdsaCurve for Secp256k1Curve {
    const ORDER: [u8; 32] = constants::CURVE_ORDER;

    fn check_public_key(public_key: &[u8; 65]) -> Result<(), CurveError> {
        PublicKey::from_slice(public_key)
            .map(|_| ())
            .map_err(|e| CurveError::InvalidPublicKey(e.to_string()))
    }

    fn verify_prehash(
        public_key: &[u8; 65],
        hash: &[u8; 32],
        r: &[u8; 32],
        s: &[u8; 32],
    ) -> Result<bool, CurveError> {
        let secp = Secp256k1::verification_only();

        let pk = PublicKey::from_slice(public_key)
            .map_err(|e| CurveError::InvalidPublicKey(e.to_string()))?;

        let sig = Signature::from_compact(&compact_signature(r, s))
            .map_err(|e| CurveError::InvalidSignature(e.to_string()))?;

        let msg = Message::from_digest(*hash);

        Ok(secp.verify_ecdsa(&msg, &sig, &pk).is_ok())
    }

    fn recover_prehash(
        hash: &[u8; 32],
        r: &[u8; 32],
        s: &[u8; 32],
        recovery_id: u8,
    ) -> Result<[u8; 65], CurveError> {
        let id = RecoveryId::from_i32(i32::from(recovery_id))
            .map_err(|_| CurveError::InvalidRecoveryId(recovery_id))?;

        let sig = RecoverableSignature::from_compact(&compact_signature(r, s), id)
            .map_err(|e| CurveError::InvalidSignature(e.to_string()))?;

        let secp = Secp256k1::verification_only();
        let msg = Message::from_digest(*hash);

        let pk = secp
            .recover_ecdsa(&msg, &sig)
            .map_err(|e| CurveError::RecoveryFailed(e.to_string()))?;

        Ok(pk.serialize_uncompressed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secp256k1::SecretKey;

    fn keypair() -> (SecretKey, [u8; 65]) {
        let secp = Secp256k1::new();
        let sk = SecretKey::from_slice(&[0x42; 32]).unwrap();
        let pk = PublicKey::from_secret_key(&secp, &sk);
        (sk, pk.serialize_uncompressed())
    }

    fn split(compact: [u8; 64]) -> ([u8; 32], [u8; 32]) {
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        s.copy_from_slice(&compact[32..]);
        (r, s)
    }

    #[test]
    fn test_verify_valid_signature() {
        let (sk, pk) = keypair();
        let hash = [0x11; 32];
        let sig = Secp256k1::new().sign_ecdsa(&Message::from_digest(hash), &sk);
        let (r, s) = split(sig.serialize_compact());

        assert!(Secp256k1Curve::verify_prehash(&pk, &hash, &r, &s).unwrap());
        assert!(!Secp256k1Curve::verify_prehash(&pk, &[0x12; 32], &r, &s).unwrap());
    }

    #[test]
    fn test_recover_matches_signer() {
        let (sk, pk) = keypair();
        let hash = [0x22; 32];
        let sig = Secp256k1::new().sign_ecdsa_recoverable(&Message::from_digest(hash), &sk);
        let (id, compact) = sig.serialize_compact();
        let (r, s) = split(compact);

        let recovered = Secp256k1Curve::recover_prehash(&hash, &r, &s, id.to_i32() as u8).unwrap();
        assert_eq!(recovered, pk);

        let other = if id.to_i32() == 0 { 1 } else { 0 };
        let wrong = Secp256k1Curve::recover_prehash(&hash, &r, &s, other);
        assert!(wrong.map(|key| key != pk).unwrap_or(true));
    }

    #[test]
    fn test_check_public_key() {
        let (_, pk) = keypair();
        assert!(Secp256k1Curve::check_public_key(&pk).is_ok());

        let mut off_curve = pk;
        off_curve[64] ^= 0x01;
        assert!(Secp256k1Curve::check_public_key(&off_curve).is_err());
    }

    #[test]
    fn test_invalid_inputs() {
        let (_, pk) = keypair();
        let mut off_curve = pk;
        off_curve[64] ^= 0x01;
        assert!(matches!(
            Secp256k1Curve::verify_prehash(&off_curve, &[0; 32], &[1; 32], &[1; 32]),
            Err(CurveError::InvalidPublicKey(_))
        ));
        assert_eq!(
            Secp256k1Curve::recover_prehash(&[0; 32], &[1; 32], &[1; 32], 4),
            Err(CurveError::InvalidRecoveryId(4))
        );
    }
}
