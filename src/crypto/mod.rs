//! Cryptographic primitives for card wallets
//!
//! Signature checking and public-key recovery over the curves a card may
//! carry keys on.

pub mod curves;

pub use curves::{
    check_public_key, curve_order, is_low_s, normalize_low_s, recover_prehash, verify_prehash, CurveError,
    CurveType, EcdsaCurve, Secp256k1Curve, MAX_RECOVERY_CANDIDATES,
};
