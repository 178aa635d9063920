//! Key Derivation
//!
//! Derives per-chain keypairs and addresses from a BIP39 mnemonic.
//! Chain selection is a closed enum resolved at compile time, not a
//! runtime string check.
//!
//! SECURITY: the intermediate seed is zeroized when derivation returns;
//! a WalletRecord never holds it.

use bip39::Mnemonic;
use bitcoin::bip32::{DerivationPath, Xpriv};
use bitcoin::secp256k1::Secp256k1;
use bitcoin::Network;
use ed25519_dalek::SigningKey;
use std::str::FromStr;
use tiny_keccak::{Hasher, Keccak};
use zeroize::Zeroizing;

use crate::error::{SolsticeError, SolsticeResult};
use crate::types::{Chain, DerivationScheme, WalletRecord};

/// BIP44 path for Ethereum account 0
const ETH_DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// Chain-polymorphic key derivation
#[derive(Debug, Clone, Copy)]
pub enum ChainDeriver {
    Eth(EthDeriver),
    Sol(SolDeriver),
}

impl ChainDeriver {
    pub fn for_chain(chain: Chain) -> Self {
        match chain {
            Chain::Ethereum => ChainDeriver::Eth(EthDeriver),
            Chain::Solana => ChainDeriver::Sol(SolDeriver),
        }
    }

    /// Derive a wallet from an already-validated mnemonic
    pub fn derive(&self, mnemonic: &Mnemonic) -> SolsticeResult<WalletRecord> {
        match self {
            ChainDeriver::Eth(d) => d.derive(mnemonic),
            ChainDeriver::Sol(d) => d.derive(mnemonic),
        }
    }

    /// Derive a wallet from a raw phrase.
    /// Fails with `InvalidMnemonic` if the checksum does not validate.
    pub fn derive_phrase(&self, phrase: &str) -> SolsticeResult<WalletRecord> {
        let mnemonic = Mnemonic::parse(phrase)
            .map_err(|e| SolsticeError::invalid_mnemonic(format!("Invalid mnemonic: {}", e)))?;
        self.derive(&mnemonic)
    }
}

// =============================================================================
// Ethereum
// =============================================================================

/// BIP44 secp256k1 derivation with an EIP-55 checksummed address
#[derive(Debug, Clone, Copy)]
pub struct EthDeriver;

impl EthDeriver {
    pub fn derive(&self, mnemonic: &Mnemonic) -> SolsticeResult<WalletRecord> {
        let seed = Zeroizing::new(mnemonic.to_seed(""));

        let secp = Secp256k1::new();
        let master = Xpriv::new_master(Network::Bitcoin, seed.as_ref())?;
        let path = DerivationPath::from_str(ETH_DERIVATION_PATH)?;
        let child = master.derive_priv(&secp, &path)?;
        let secret_key = child.private_key;

        let private_key = format!("0x{}", hex::encode(secret_key.secret_bytes()));

        let public_key = secret_key.public_key(&secp);
        let uncompressed = public_key.serialize_uncompressed();
        // Drop the 0x04 prefix before hashing
        let address_hash = keccak256(&uncompressed[1..]);
        let address = to_checksum_address(&address_hash[12..]);

        Ok(WalletRecord {
            chain: Chain::Ethereum,
            address,
            private_key,
            derivation: DerivationScheme::Bip44Account0,
        })
    }
}

// =============================================================================
// Solana
// =============================================================================

/// Truncated-seed ed25519 derivation.
///
/// The first 32 bytes of the BIP39 seed are used directly as the signing-key
/// seed instead of walking a hardened SLIP-0010 path per account index.
/// This is deterministic and reproducible, but addresses will NOT match
/// wallets that derive through `m/44'/501'/...`. Kept intentionally for
/// compatibility with existing wallets generated this way.
#[derive(Debug, Clone, Copy)]
pub struct SolDeriver;

impl SolDeriver {
    pub fn derive(&self, mnemonic: &Mnemonic) -> SolsticeResult<WalletRecord> {
        let seed = Zeroizing::new(mnemonic.to_seed(""));

        let mut key_seed = Zeroizing::new([0u8; 32]);
        key_seed.copy_from_slice(&seed[..32]);

        let signing_key = SigningKey::from_bytes(&key_seed);
        let public_key_bytes = signing_key.verifying_key().to_bytes();

        // Solana keypair convention: 64 bytes = secret seed || public key
        let mut keypair_bytes = Zeroizing::new([0u8; 64]);
        keypair_bytes[..32].copy_from_slice(&signing_key.to_bytes());
        keypair_bytes[32..].copy_from_slice(&public_key_bytes);

        Ok(WalletRecord {
            chain: Chain::Solana,
            address: bs58::encode(public_key_bytes).into_string(),
            private_key: bs58::encode(&keypair_bytes[..]).into_string(),
            derivation: DerivationScheme::TruncatedSeed,
        })
    }
}

// Helper functions

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// EIP-55 mixed-case checksum encoding of a 20-byte address
pub fn to_checksum_address(address: &[u8]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut result = String::from("0x");
    for (i, ch) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };

        if ch.is_ascii_digit() {
            result.push(ch);
        } else if nibble >= 8 {
            result.push(ch.to_ascii_uppercase());
        } else {
            result.push(ch);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    const TEST_MNEMONIC: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_eth_matches_reference_vector() {
        // Published BIP44 address for the standard test mnemonic at m/44'/60'/0'/0/0
        let record = ChainDeriver::for_chain(Chain::Ethereum)
            .derive_phrase(TEST_MNEMONIC)
            .unwrap();
        assert_eq!(record.address, "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
        assert!(record.private_key.starts_with("0x"));
        assert_eq!(record.private_key.len(), 66);
    }

    #[test]
    fn test_derivation_is_deterministic() {
        for chain in [Chain::Ethereum, Chain::Solana] {
            let deriver = ChainDeriver::for_chain(chain);
            let first = deriver.derive_phrase(TEST_MNEMONIC).unwrap();
            let second = deriver.derive_phrase(TEST_MNEMONIC).unwrap();
            assert_eq!(first.address, second.address);
            assert_eq!(first.private_key, second.private_key);
        }
    }

    #[test]
    fn test_sol_keypair_layout() {
        let record = ChainDeriver::for_chain(Chain::Solana)
            .derive_phrase(TEST_MNEMONIC)
            .unwrap();

        let keypair = bs58::decode(&record.private_key).into_vec().unwrap();
        assert_eq!(keypair.len(), 64);

        // The trailing 32 bytes are the public key the address encodes
        let address_bytes = bs58::decode(&record.address).into_vec().unwrap();
        assert_eq!(&keypair[32..], address_bytes.as_slice());
        assert_eq!(record.derivation, DerivationScheme::TruncatedSeed);
    }

    #[test]
    fn test_invalid_mnemonic_rejected() {
        for chain in [Chain::Ethereum, Chain::Solana] {
            let err = ChainDeriver::for_chain(chain)
                .derive_phrase("not a valid phrase at all")
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidMnemonic);
        }
    }

    #[test]
    fn test_checksum_address_known_value() {
        // EIP-55 reference case
        let bytes = hex::decode("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(
            to_checksum_address(&bytes),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
    }
}
