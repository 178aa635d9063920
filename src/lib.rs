//! Solstice Core Library
//!
//! Session-local wallet generation and swap execution engine.
//!
//! # Architecture
//!
//! This crate provides:
//! - **wallet**: session seed phrase, per-chain key derivation, wallet store
//! - **balances**: per-chain balance lookup with failure isolation
//! - **swap**: the quote -> build -> sign -> submit -> confirm lifecycle,
//!   coordinated by the `SwapOrder` state machine
//! - **utils**: pooled HTTP client and redacting logger
//!
//! # Security
//!
//! This crate uses `zeroize` to clear sensitive data from memory: entropy
//! and seeds are zeroed when dropped, and the logger redacts mnemonics and
//! private keys. Nothing here persists key material.
//!
//! # Example
//!
//! ```rust,ignore
//! use solstice_core::{wallet, types::Chain};
//!
//! let mut generator = wallet::SeedPhraseGenerator::new();
//! let record = wallet::generate_wallet(&mut generator, Chain::Solana)?;
//! println!("Solana address: {}", record.address);
//! ```

pub mod balances;
pub mod error;
pub mod swap;
pub mod types;
pub mod utils;
pub mod wallet;

// Re-export key types for convenience
pub use error::{ErrorCode, SolsticeError, SolsticeResult};
pub use types::*;

// Re-export wallet functions
pub use wallet::{
    generate_wallet,
    validate_mnemonic,
    ChainDeriver,
    SeedPhraseGenerator,
    WalletStore,
};

// Re-export crypto helpers used by the test suites
pub use wallet::{keccak256, to_checksum_address};
