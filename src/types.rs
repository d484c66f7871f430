//! Shared types for the card wallet core
//!
//! All data structures that cross module boundaries are defined here
//! for consistent serialization.

use crate::error::{ErrorCode, WalletError, WalletResult};
use chrono::{DateTime, Utc};
use ethers_core::types::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Chain Types
// =============================================================================

/// Supported EVM networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Chain {
    Ethereum,
    EthereumSepolia,
    Bnb,
    Polygon,
    Arbitrum,
    Optimism,
    Base,
    Avalanche,
}

impl Chain {
    pub const ALL: [Chain; 8] = [
        Chain::Ethereum,
        Chain::EthereumSepolia,
        Chain::Bnb,
        Chain::Polygon,
        Chain::Arbitrum,
        Chain::Optimism,
        Chain::Base,
        Chain::Avalanche,
    ];

    /// EIP-155 chain id
    pub fn chain_id(&self) -> u64 {
        match self {
            Chain::Ethereum => 1,
            Chain::EthereumSepolia => 11155111,
            Chain::Bnb => 56,
            Chain::Polygon => 137,
            Chain::Arbitrum => 42161,
            Chain::Optimism => 10,
            Chain::Base => 8453,
            Chain::Avalanche => 43114,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Chain::Ethereum | Chain::EthereumSepolia => "ETH",
            Chain::Bnb => "BNB",
            Chain::Polygon => "MATIC",
            Chain::Arbitrum => "ETH",
            Chain::Optimism => "ETH",
            Chain::Base => "ETH",
            Chain::Avalanche => "AVAX",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Chain::Ethereum => "Ethereum",
            Chain::EthereumSepolia => "Ethereum Sepolia",
            Chain::Bnb => "BNB Smart Chain",
            Chain::Polygon => "Polygon",
            Chain::Arbitrum => "Arbitrum One",
            Chain::Optimism => "Optimism",
            Chain::Base => "Base",
            Chain::Avalanche => "Avalanche C-Chain",
        }
    }

    /// Decimals of the native currency (all supported chains use wei)
    pub fn decimals(&self) -> u8 {
        18
    }

    /// Block explorer base URL, without the trailing path segment
    pub fn explorer_base(&self) -> &'static str {
        match self {
            Chain::Ethereum => "https://etherscan.io",
            Chain::EthereumSepolia => "https://sepolia.etherscan.io",
            Chain::Bnb => "https://bscscan.com",
            Chain::Polygon => "https://polygonscan.com",
            Chain::Arbitrum => "https://arbiscan.io",
            Chain::Optimism => "https://optimistic.etherscan.io",
            Chain::Base => "https://basescan.org",
            Chain::Avalanche => "https://snowtrace.io",
        }
    }

    /// URI scheme used in payment QR codes
    pub fn qr_prefix(&self) -> &'static str {
        match self {
            Chain::Bnb => "bnb:",
            Chain::Polygon => "polygon:",
            Chain::Avalanche => "avalanche:",
            _ => "ethereum:",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Chain {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "ethereum" | "eth" | "mainnet" => Ok(Chain::Ethereum),
            "ethereum_sepolia" | "sepolia" => Ok(Chain::EthereumSepolia),
            "bnb" | "bsc" | "binance" => Ok(Chain::Bnb),
            "polygon" | "matic" => Ok(Chain::Polygon),
            "arbitrum" | "arb" => Ok(Chain::Arbitrum),
            "optimism" | "op" => Ok(Chain::Optimism),
            "base" => Ok(Chain::Base),
            "avalanche" | "avax" => Ok(Chain::Avalanche),
            _ => Err(WalletError::new(
                ErrorCode::InvalidConfig,
                format!("Unknown chain: {}", s),
            )),
        }
    }
}

// =============================================================================
// Keys and Addresses
// =============================================================================

fn strip_hex_prefix(s: &str) -> &str {
    let trimmed = s.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
}

/// Public key as delivered by the card. Never private key material.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey(Vec<u8>);

impl PublicKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn from_hex(s: &str) -> WalletResult<Self> {
        hex::decode(strip_hex_prefix(s))
            .map(Self)
            .map_err(|e| WalletError::invalid_public_key("Public key is not valid hex").with_details(e.to_string()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// The `X‖Y` coordinates of an uncompressed EC point.
    ///
    /// Accepts the 65-byte SEC1 form (`0x04` prefix) or the bare 64 bytes.
    pub fn uncompressed_xy(&self) -> WalletResult<[u8; 64]> {
        let xy: &[u8] = match self.0.len() {
            65 if self.0[0] == 0x04 => &self.0[1..],
            64 => &self.0,
            65 => {
                return Err(WalletError::invalid_public_key(format!(
                    "Unexpected public key prefix 0x{:02x}",
                    self.0[0]
                )))
            }
            len => {
                return Err(WalletError::invalid_public_key(format!(
                    "Expected a 64 or 65 byte uncompressed public key, got {} bytes",
                    len
                )))
            }
        };
        let mut out = [0u8; 64];
        out.copy_from_slice(xy);
        Ok(out)
    }

    /// SEC1 uncompressed encoding (`0x04‖X‖Y`)
    pub fn to_sec1_uncompressed(&self) -> WalletResult<[u8; 65]> {
        let xy = self.uncompressed_xy()?;
        let mut out = [0u8; 65];
        out[0] = 0x04;
        out[1..].copy_from_slice(&xy);
        Ok(out)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        PublicKey::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// 20-byte EVM account address
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    pub const LENGTH: usize = 20;

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// EIP-55 mixed-case rendering for display
    pub fn to_checksum(&self) -> String {
        crate::utils::crypto::to_checksum_address(&self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(WalletError::invalid_address("Address is empty"));
        }
        if !s.to_lowercase().starts_with("0x") {
            return Err(WalletError::invalid_address("Address must start with 0x"));
        }
        if s.len() != 42 {
            return Err(WalletError::invalid_address(format!(
                "Address must be 42 characters, got {}",
                s.len()
            )));
        }
        let bytes = hex::decode(&s[2..])
            .map_err(|e| WalletError::invalid_address("Address is not valid hex").with_details(e.to_string()))?;
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Signing Types
// =============================================================================

/// 32-byte digest handed to the card for signing
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SigningHash([u8; 32]);

impl SigningHash {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> WalletResult<Self> {
        let bytes = hex::decode(strip_hex_prefix(s))?;
        let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            WalletError::invalid_transaction(format!("Signing hash must be 32 bytes, got {}", v.len()))
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for SigningHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for SigningHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningHash({})", self.to_hex())
    }
}

impl Serialize for SigningHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Compact `r‖s` signature returned by the card, without a recovery id
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RawSignature([u8; 64]);

impl RawSignature {
    pub const LENGTH: usize = 64;

    pub fn new(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> WalletResult<Self> {
        let arr: [u8; 64] = bytes.try_into().map_err(|_| {
            WalletError::verification_failed(format!(
                "Card signature must be {} bytes, got {}",
                Self::LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    pub fn from_hex(s: &str) -> WalletResult<Self> {
        let bytes = hex::decode(strip_hex_prefix(s)).map_err(|e| {
            WalletError::verification_failed("Card signature is not valid hex").with_details(e.to_string())
        })?;
        Self::from_slice(&bytes)
    }

    pub fn from_parts(r: [u8; 32], s: [u8; 32]) -> Self {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&r);
        out[32..].copy_from_slice(&s);
        Self(out)
    }

    pub fn r(&self) -> [u8; 32] {
        let mut r = [0u8; 32];
        r.copy_from_slice(&self.0[..32]);
        r
    }

    pub fn s(&self) -> [u8; 32] {
        let mut s = [0u8; 32];
        s.copy_from_slice(&self.0[32..]);
        s
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Debug for RawSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawSignature(0x{})", hex::encode(self.0))
    }
}

/// Transaction id returned by the node after a successful broadcast
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Fee Types
// =============================================================================

/// Three fee tiers for a plain value transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeQuote {
    /// Display-unit amounts, trailing zeros trimmed
    pub min: String,
    pub normal: String,
    pub max: String,
    /// Same tiers in minor units
    pub min_wei: U256,
    pub normal_wei: U256,
    pub max_wei: U256,
    pub gas_price: U256,
    pub gas_limit: u64,
    pub fetched_at: DateTime<Utc>,
}

// =============================================================================
// API Response Types
// =============================================================================

/// Generic API response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<WalletError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: WalletError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"error":{"code":"internal","message":"Serialization failed"}}"#.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_properties() {
        assert_eq!(Chain::Ethereum.chain_id(), 1);
        assert_eq!(Chain::Ethereum.decimals(), 18);
        assert_eq!(Chain::Ethereum.symbol(), "ETH");
        assert_eq!(Chain::Ethereum.qr_prefix(), "ethereum:");
        assert_eq!(Chain::EthereumSepolia.chain_id(), 11155111);
        assert_eq!("bsc".parse::<Chain>().unwrap(), Chain::Bnb);
        assert!("dogecoin".parse::<Chain>().is_err());
    }

    #[test]
    fn test_address_parsing() {
        let addr: Address = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf".parse().unwrap();
        assert_eq!(addr.to_string(), "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf");
        assert_eq!(addr.to_checksum(), "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf");

        assert_eq!(
            "".parse::<Address>().unwrap_err().code,
            ErrorCode::InvalidAddress
        );
        assert!("7e5f4552091a69125d5dfcb7b8c2659029395bdf00".parse::<Address>().is_err());
        assert!("0x7e5f".parse::<Address>().is_err());
        assert!("0xzz5f4552091a69125d5dfcb7b8c2659029395bdf".parse::<Address>().is_err());
        assert!("0X7E5F4552091A69125D5DFCB7B8C2659029395BDF".parse::<Address>().is_ok());
    }

    #[test]
    fn test_public_key_forms() {
        let mut sec1 = vec![0x04];
        sec1.extend_from_slice(&[0x11; 64]);
        let with_prefix = PublicKey::new(sec1.clone());
        let bare = PublicKey::new(vec![0x11; 64]);

        assert_eq!(with_prefix.uncompressed_xy().unwrap(), bare.uncompressed_xy().unwrap());
        assert_eq!(bare.to_sec1_uncompressed().unwrap().to_vec(), sec1);

        let compressed = PublicKey::new(vec![0x02; 33]);
        assert_eq!(
            compressed.uncompressed_xy().unwrap_err().code,
            ErrorCode::InvalidPublicKeyFormat
        );

        let mut wrong_prefix = vec![0x05];
        wrong_prefix.extend_from_slice(&[0x11; 64]);
        assert!(PublicKey::new(wrong_prefix).uncompressed_xy().is_err());
    }

    #[test]
    fn test_raw_signature_length() {
        assert!(RawSignature::from_slice(&[0u8; 64]).is_ok());
        let err = RawSignature::from_slice(&[0u8; 65]).unwrap_err();
        assert_eq!(err.code, ErrorCode::SignatureVerificationFailed);

        let sig = RawSignature::from_parts([1; 32], [2; 32]);
        assert_eq!(sig.r(), [1; 32]);
        assert_eq!(sig.s(), [2; 32]);
    }

    #[test]
    fn test_api_response_serialization() {
        let response = ApiResponse::ok("test_data".to_string());
        let json = response.to_json();
        assert!(json.contains("success"));
        assert!(json.contains("test_data"));

        let failed: ApiResponse<()> = ApiResponse::err(WalletError::cancelled("stopped"));
        assert!(failed.to_json().contains("cancelled"));
    }
}
