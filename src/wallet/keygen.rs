//! Seed Phrase Generation
//!
//! One mnemonic per session: the first `generate()` draws fresh entropy,
//! every later call returns the same phrase until `reset()`.
//!
//! SECURITY: entropy is zeroized after the mnemonic is encoded.

use bip39::Mnemonic;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::{SolsticeError, SolsticeResult};

/// Default entropy size: 128 bits -> 12 words
const ENTROPY_BYTES: usize = 16;

/// Session-scoped mnemonic holder
#[derive(Debug, Default)]
pub struct SeedPhraseGenerator {
    mnemonic: Option<Mnemonic>,
}

impl SeedPhraseGenerator {
    pub fn new() -> Self {
        Self { mnemonic: None }
    }

    /// Return the session mnemonic, generating one on first use.
    ///
    /// Idempotent within a session: repeated calls return the same phrase.
    pub fn generate(&mut self) -> SolsticeResult<Mnemonic> {
        if let Some(ref mnemonic) = self.mnemonic {
            return Ok(mnemonic.clone());
        }

        let mut entropy = Zeroizing::new([0u8; ENTROPY_BYTES]);
        OsRng
            .try_fill_bytes(entropy.as_mut())
            .map_err(|e| SolsticeError::entropy_unavailable(format!("OS RNG failed: {}", e)))?;

        let mnemonic = Mnemonic::from_entropy(entropy.as_ref())
            .map_err(|e| SolsticeError::crypto_error(format!("Failed to encode mnemonic: {}", e)))?;

        self.mnemonic = Some(mnemonic.clone());
        Ok(mnemonic)
    }

    /// Replace the session mnemonic with an externally supplied phrase.
    /// Fails with `InvalidMnemonic` if the checksum does not validate.
    pub fn restore(&mut self, phrase: &str) -> SolsticeResult<Mnemonic> {
        let mnemonic = Mnemonic::parse(phrase)
            .map_err(|e| SolsticeError::invalid_mnemonic(format!("Invalid mnemonic: {}", e)))?;
        self.mnemonic = Some(mnemonic.clone());
        Ok(mnemonic)
    }

    /// Current session phrase, if one exists
    pub fn phrase(&self) -> Option<String> {
        self.mnemonic.as_ref().map(|m| m.to_string())
    }

    /// Drop the session mnemonic; the next `generate()` draws fresh entropy
    pub fn reset(&mut self) {
        self.mnemonic = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_generate_is_idempotent() {
        let mut generator = SeedPhraseGenerator::new();
        let first = generator.generate().unwrap();
        let second = generator.generate().unwrap();
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_generates_twelve_words() {
        let mut generator = SeedPhraseGenerator::new();
        let mnemonic = generator.generate().unwrap();
        assert_eq!(mnemonic.to_string().split_whitespace().count(), 12);
    }

    #[test]
    fn test_generated_phrase_validates() {
        let mut generator = SeedPhraseGenerator::new();
        let phrase = generator.generate().unwrap().to_string();
        assert!(Mnemonic::parse(&phrase).is_ok());
    }

    #[test]
    fn test_reset_clears_session() {
        let mut generator = SeedPhraseGenerator::new();
        generator.generate().unwrap();
        assert!(generator.phrase().is_some());
        generator.reset();
        assert!(generator.phrase().is_none());
    }

    #[test]
    fn test_restore_rejects_bad_checksum() {
        let mut generator = SeedPhraseGenerator::new();
        let err = generator
            .restore("abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidMnemonic);
    }

    #[test]
    fn test_restore_accepts_valid_phrase() {
        let mut generator = SeedPhraseGenerator::new();
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        generator.restore(phrase).unwrap();
        assert_eq!(generator.phrase().as_deref(), Some(phrase));
    }
}
