//! Unified error types for the card wallet core
//!
//! Every failure of a send attempt is reported as a [`WalletError`] whose
//! [`ErrorCode`] tells the caller what went wrong and whose
//! [`ErrorCategory`] tells the UI which kind of message to show.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for all wallet core operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl WalletError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn invalid_public_key(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidPublicKeyFormat, msg)
    }

    pub fn amount_parse(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::AmountParseError, msg)
    }

    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidAmount, msg)
    }

    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidAddress, msg)
    }

    pub fn invalid_transaction(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidTransaction, msg)
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfig, msg)
    }

    pub fn fee_query_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::FeeQueryFailed, msg)
    }

    pub fn verification_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SignatureVerificationFailed, msg)
    }

    pub fn recovery_id_not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RecoveryIdNotFound, msg)
    }

    pub fn broadcast_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::BroadcastFailed, msg)
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, msg)
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Cancelled, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }

    /// User-facing category of this error
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    pub fn is_cancelled(&self) -> bool {
        self.code == ErrorCode::Cancelled
    }
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for WalletError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Input errors
    InvalidPublicKeyFormat,
    AmountParseError,
    InvalidAmount,
    InvalidAddress,
    InvalidTransaction,
    InvalidConfig,

    // Network errors
    FeeQueryFailed,
    NetworkError,
    Timeout,

    // Transaction errors
    BroadcastFailed,

    // Signature errors
    SignatureVerificationFailed,
    RecoveryIdNotFound,

    // Parse errors
    JsonError,
    HexError,

    // Control flow
    Cancelled,

    // Internal
    Internal,
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorCode::InvalidPublicKeyFormat | ErrorCode::SignatureVerificationFailed => {
                ErrorCategory::Device
            }
            ErrorCode::AmountParseError
            | ErrorCode::InvalidAmount
            | ErrorCode::InvalidAddress
            | ErrorCode::InvalidTransaction
            | ErrorCode::HexError => ErrorCategory::InvalidInput,
            ErrorCode::FeeQueryFailed | ErrorCode::NetworkError | ErrorCode::Timeout => {
                ErrorCategory::Network
            }
            ErrorCode::BroadcastFailed => ErrorCategory::Broadcast,
            ErrorCode::Cancelled => ErrorCategory::Cancelled,
            // A verified signature that recovers to no candidate is a curve or
            // encoding bug, not a device fault.
            ErrorCode::RecoveryIdNotFound
            | ErrorCode::InvalidConfig
            | ErrorCode::JsonError
            | ErrorCode::Internal => ErrorCategory::Internal,
        }
    }
}

/// Distinct message families shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    InvalidInput,
    Device,
    Network,
    Broadcast,
    Cancelled,
    Internal,
}

impl ErrorCategory {
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorCategory::InvalidInput => "Please check the amount and destination address",
            ErrorCategory::Device => "The card produced an invalid signature, please sign again",
            ErrorCategory::Network => "The network is unavailable, please try again later",
            ErrorCategory::Broadcast => "The network rejected the transaction",
            ErrorCategory::Cancelled => "The operation was cancelled",
            ErrorCategory::Internal => "Something went wrong, please contact support",
        }
    }
}

/// Result type alias for wallet core operations
pub type WalletResult<T> = Result<T, WalletError>;

// Conversions from common error types

impl From<serde_json::Error> for WalletError {
    fn from(e: serde_json::Error) -> Self {
        WalletError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<hex::FromHexError> for WalletError {
    fn from(e: hex::FromHexError) -> Self {
        WalletError::new(ErrorCode::HexError, e.to_string())
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            WalletError::new(ErrorCode::Timeout, "Request timed out")
        } else if e.is_connect() {
            WalletError::new(ErrorCode::NetworkError, "Connection failed")
        } else {
            WalletError::new(ErrorCode::NetworkError, e.to_string())
        }
    }
}

impl From<url::ParseError> for WalletError {
    fn from(e: url::ParseError) -> Self {
        WalletError::new(ErrorCode::InvalidConfig, format!("Invalid URL: {}", e))
    }
}
