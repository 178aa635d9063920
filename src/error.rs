//! Unified error types for Solstice Core
//!
//! All errors flow through this module so callers can distinguish failure
//! kinds without string matching. In particular, an expired confirmation
//! window and an on-chain failure carry different codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for all Solstice operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolsticeError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl SolsticeError {
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

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn entropy_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::EntropyUnavailable, msg)
    }

    pub fn invalid_mnemonic(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidMnemonic, msg)
    }

    pub fn network_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, msg)
    }

    pub fn quote_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::QuoteUnavailable, msg)
    }

    pub fn build_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::BuildFailed, msg)
    }

    pub fn deserialization_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::DeserializationFailed, msg)
    }

    pub fn signing_rejected(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SigningRejected, msg)
    }

    pub fn submission_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SubmissionFailed, msg)
    }

    pub fn confirmation_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfirmationFailed, msg)
    }

    pub fn confirmation_expired(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfirmationExpired, msg)
    }

    pub fn balance_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::BalanceUnavailable, msg)
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidState, msg)
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, msg)
    }

    pub fn crypto_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::CryptoError, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }

    /// Transport-level failures that are worth one more attempt.
    /// On-chain rejections and malformed responses are not.
    pub fn is_transient(&self) -> bool {
        matches!(self.code, ErrorCode::NetworkError | ErrorCode::Timeout)
    }
}

impl fmt::Display for SolsticeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for SolsticeError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Input errors
    InvalidInput,
    InvalidMnemonic,

    // Wallet generation errors
    EntropyUnavailable,

    // Network errors
    NetworkError,
    Timeout,

    // Swap lifecycle errors
    QuoteUnavailable,
    BuildFailed,
    DeserializationFailed,
    SigningRejected,
    SubmissionFailed,
    ConfirmationFailed,
    ConfirmationExpired,

    // Balance lookup
    BalanceUnavailable,

    // State machine guards
    InvalidState,

    // Crypto errors
    CryptoError,

    // Parse errors
    ParseError,
    JsonError,

    // Internal
    Internal,
}

/// Result type alias for Solstice operations
pub type SolsticeResult<T> = Result<T, SolsticeError>;

// Conversions from common error types

impl From<serde_json::Error> for SolsticeError {
    fn from(e: serde_json::Error) -> Self {
        SolsticeError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<hex::FromHexError> for SolsticeError {
    fn from(e: hex::FromHexError) -> Self {
        SolsticeError::new(ErrorCode::ParseError, e.to_string())
    }
}

impl From<reqwest::Error> for SolsticeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SolsticeError::new(ErrorCode::Timeout, "Request timed out")
        } else if e.is_connect() {
            SolsticeError::new(ErrorCode::NetworkError, "Connection failed")
        } else {
            SolsticeError::new(ErrorCode::NetworkError, e.to_string())
        }
    }
}

impl From<bitcoin::bip32::Error> for SolsticeError {
    fn from(e: bitcoin::bip32::Error) -> Self {
        SolsticeError::new(ErrorCode::CryptoError, format!("BIP32 error: {}", e))
    }
}

impl From<bitcoin::secp256k1::Error> for SolsticeError {
    fn from(e: bitcoin::secp256k1::Error) -> Self {
        SolsticeError::new(ErrorCode::CryptoError, format!("Secp256k1 error: {}", e))
    }
}

impl From<bip39::Error> for SolsticeError {
    fn from(e: bip39::Error) -> Self {
        SolsticeError::new(ErrorCode::InvalidMnemonic, format!("BIP39 error: {}", e))
    }
}

impl From<base64::DecodeError> for SolsticeError {
    fn from(e: base64::DecodeError) -> Self {
        SolsticeError::new(ErrorCode::DeserializationFailed, format!("Base64 error: {}", e))
    }
}

impl From<bincode::Error> for SolsticeError {
    fn from(e: bincode::Error) -> Self {
        SolsticeError::new(ErrorCode::DeserializationFailed, e.to_string())
    }
}
