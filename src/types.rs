//! Shared types for Solstice Core
//!
//! Data structures that cross module boundaries are defined here
//! for consistent serialization.

use serde::{Deserialize, Serialize};

use crate::error::{SolsticeError, SolsticeResult};

// =============================================================================
// Chain Types
// =============================================================================

/// Supported blockchain networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Chain {
    Ethereum,
    Solana,
}

impl Chain {
    pub fn symbol(&self) -> &'static str {
        match self {
            Chain::Ethereum => "ETH",
            Chain::Solana => "SOL",
        }
    }

    /// Decimals of the chain's native asset (wei vs lamports)
    pub fn decimals(&self) -> u8 {
        match self {
            Chain::Ethereum => 18,
            Chain::Solana => 9,
        }
    }
}

impl std::str::FromStr for Chain {
    type Err = SolsticeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ethereum" | "eth" => Ok(Chain::Ethereum),
            "solana" | "sol" => Ok(Chain::Solana),
            _ => Err(SolsticeError::invalid_input(format!("Unknown chain: {}", s))),
        }
    }
}

// =============================================================================
// Wallet Types
// =============================================================================

/// How a wallet's keypair was obtained from the session mnemonic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationScheme {
    /// BIP44 hierarchical path, account 0 (`m/44'/60'/0'/0/0`)
    Bip44Account0,
    /// First 32 bytes of the BIP39 seed used directly as an ed25519 seed.
    /// Deterministic, but not interoperable with SLIP-0010 wallets.
    TruncatedSeed,
}

impl DerivationScheme {
    pub fn describe(&self) -> &'static str {
        match self {
            DerivationScheme::Bip44Account0 => "m/44'/60'/0'/0/0",
            DerivationScheme::TruncatedSeed => "seed[0..32]",
        }
    }
}

/// One derived wallet. Owned by the session store, never persisted.
///
/// Records are independent of the mnemonic that produced them: deleting
/// the phrase does not invalidate an existing record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletRecord {
    pub chain: Chain,
    /// Chain-native address encoding (EIP-55 hex or base58)
    pub address: String,
    /// Chain-native private key encoding (0x-hex or base58 secret||public)
    pub private_key: String,
    pub derivation: DerivationScheme,
}

// =============================================================================
// Amount Conversion
// =============================================================================

/// Convert a human decimal amount to integer base units.
///
/// Rejects non-numeric and non-positive input before anything crosses a
/// chain boundary. Parsed with integer arithmetic so no float rounding
/// leaks into amounts; fractional dust below the asset's precision is
/// truncated, matching aggregator behavior.
pub fn decimal_to_base_units(amount: &str, decimals: u8) -> SolsticeResult<u64> {
    let trimmed = amount.trim();
    let invalid = || SolsticeError::invalid_input(format!("Invalid amount: {}", amount));

    let (whole_str, frac_str) = match trimmed.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (trimmed, ""),
    };

    if whole_str.is_empty() && frac_str.is_empty() {
        return Err(invalid());
    }
    if !whole_str.chars().all(|c| c.is_ascii_digit())
        || !frac_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let whole: u64 = if whole_str.is_empty() {
        0
    } else {
        whole_str.parse().map_err(|_| invalid())?
    };

    let mut frac_digits: String = frac_str.chars().take(decimals as usize).collect();
    while frac_digits.len() < decimals as usize {
        frac_digits.push('0');
    }
    let frac: u64 = if frac_digits.is_empty() {
        0
    } else {
        frac_digits.parse().map_err(|_| invalid())?
    };

    let scale = 10u64.pow(decimals as u32);
    let base = whole
        .checked_mul(scale)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| SolsticeError::invalid_input("Amount exceeds representable range"))?;

    if base == 0 {
        return Err(SolsticeError::invalid_input(format!(
            "Amount must be a positive number, got {}",
            amount
        )));
    }

    Ok(base)
}

/// Format integer base units as a decimal string with the asset's full
/// precision (trailing zeros kept): 150000000 at 6 decimals -> "150.000000"
pub fn format_base_units(amount: u64, decimals: u8) -> String {
    let divisor = 10u64.pow(decimals as u32);
    let whole = amount / divisor;
    let frac = amount % divisor;
    format!("{}.{:0>width$}", whole, frac, width = decimals as usize)
}

/// Format integer base units as a trimmed decimal string for display:
/// 1500000000000000000 at 18 decimals -> "1.5", exact multiples -> "1"
pub fn format_base_units_trimmed(amount: u128, decimals: u8) -> String {
    let divisor = 10u128.pow(decimals as u32);
    let whole = amount / divisor;
    let frac = amount % divisor;

    if frac == 0 {
        whole.to_string()
    } else {
        let frac_str = format!("{:0>width$}", frac, width = decimals as usize);
        let trimmed = frac_str.trim_end_matches('0');
        format!("{}.{}", whole, trimmed)
    }
}
