//! Wallet Module
//!
//! Handles session seed phrase generation, per-chain key derivation,
//! and the session wallet store.

mod derivation;
mod keygen;
mod store;

pub use derivation::*;
pub use keygen::*;
pub use store::*;

use crate::error::SolsticeResult;
use crate::types::{Chain, WalletRecord};

/// Generate a wallet for `chain` against the session mnemonic,
/// creating the mnemonic on first use.
pub fn generate_wallet(
    generator: &mut SeedPhraseGenerator,
    chain: Chain,
) -> SolsticeResult<WalletRecord> {
    let mnemonic = generator.generate()?;
    ChainDeriver::for_chain(chain).derive(&mnemonic)
}

/// Check if a mnemonic phrase is valid
pub fn validate_mnemonic(phrase: &str) -> bool {
    bip39::Mnemonic::parse(phrase).is_ok()
}
