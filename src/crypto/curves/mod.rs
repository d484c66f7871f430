//! Multi-Curve Signature Support
//!
//! Cards hold keys on one of several curves. This module gives the signing
//! core a uniform view over them:
//!
//! - `secp256k1`: Ethereum and every EVM chain; the only curve the
//!   signing core verifies and recovers on
//! - `secp256r1` (P-256/NIST) and `ed25519`: listed so card wallets can be
//!   matched by curve; nodes recover senders with secp256k1 only, so the
//!   EVM rule rejects both
//!
//! # Architecture
//!
//! ECDSA curves implement [`EcdsaCurve`], which provides prehash
//! verification and public-key recovery. Low-S normalization works on the
//! curve order alone and lives in [`normalize`].

pub mod normalize;
pub mod secp256k1;
pub mod traits;

pub use normalize::{is_low_s, normalize_low_s};
pub use secp256k1::Secp256k1Curve;
pub use traits::*;

use crate::error::{ErrorCode, WalletError};
use serde::{Deserialize, Serialize};

// MARK: - Curve Type Enum

/// Supported elliptic curve types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    /// secp256k1 - Ethereum, BNB, Polygon, etc.
    Secp256k1,
    /// secp256r1 (P-256/NIST)
    Secp256r1,
    /// Ed25519
    Ed25519,
}

impl CurveType {
    /// Get the curve name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Self::Secp256k1 => "secp256k1",
            Self::Secp256r1 => "secp256r1",
            Self::Ed25519 => "ed25519",
        }
    }

    /// Parse curve type from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "secp256k1" | "k1" => Some(Self::Secp256k1),
            "secp256r1" | "p256" | "p-256" | "nist256p1" | "r1" => Some(Self::Secp256r1),
            "ed25519" => Some(Self::Ed25519),
            _ => None,
        }
    }
}

impl std::fmt::Display for CurveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for CurveType {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
            .ok_or_else(|| WalletError::new(ErrorCode::InvalidConfig, format!("Unknown curve: {}", s)))
    }
}

// MARK: - Curve Errors

/// Errors that can occur during curve operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CurveError {
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("Public key recovery failed: {0}")]
    RecoveryFailed(String),

    #[error("Unsupported curve: {0}")]
    UnsupportedCurve(CurveType),
}

impl From<CurveError> for WalletError {
    fn from(e: CurveError) -> Self {
        let code = match e {
            CurveError::InvalidPublicKey(_) => ErrorCode::InvalidPublicKeyFormat,
            CurveError::InvalidSignature(_) => ErrorCode::SignatureVerificationFailed,
            CurveError::InvalidRecoveryId(_) | CurveError::RecoveryFailed(_) => {
                ErrorCode::RecoveryIdNotFound
            }
            CurveError::UnsupportedCurve(_) => ErrorCode::InvalidConfig,
        };
        WalletError::new(code, e.to_string())
    }
}

// MARK: - Unified Interface

/// Group order of an ECDSA curve, big-endian
pub fn curve_order(curve: CurveType) -> Result<[u8; 32], CurveError> {
    match curve {
        CurveType::Secp256k1 => Ok(Secp256k1Curve::ORDER),
        CurveType::Secp256r1 | CurveType::Ed25519 => Err(CurveError::UnsupportedCurve(curve)),
    }
}

/// Check that an uncompressed public key lies on `curve`
pub fn check_public_key(curve: CurveType, public_key: &[u8; 65]) -> Result<(), CurveError> {
    match curve {
        CurveType::Secp256k1 => Secp256k1Curve::check_public_key(public_key),
        CurveType::Secp256r1 | CurveType::Ed25519 => Err(CurveError::UnsupportedCurve(curve)),
    }
}

/// Verify `(r, s)` over a 32-byte prehash
pub fn verify_prehash(
    curve: CurveType,
    public_key: &[u8; 65],
    hash: &[u8; 32],
    r: &[u8; 32],
    s: &[u8; 32],
) -> Result<bool, CurveError> {
    match curve {
        CurveType::Secp256k1 => Secp256k1Curve::verify_prehash(public_key, hash, r, s),
        CurveType::Secp256r1 | CurveType::Ed25519 => Err(CurveError::UnsupportedCurve(curve)),
    }
}

/// Recover the uncompressed public key for one recovery id
pub fn recover_prehash(
    curve: CurveType,
    hash: &[u8; 32],
    r: &[u8; 32],
    s: &[u8; 32],
    recovery_id: u8,
) -> Result<[u8; 65], CurveError> {
    match curve {
        CurveType::Secp256k1 => Secp256k1Curve::recover_prehash(hash, r, s, recovery_id),
        CurveType::Secp256r1 | CurveType::Ed25519 => Err(CurveError::UnsupportedCurve(curve)),
    }
}
