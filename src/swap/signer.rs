//! Transaction Signing
//!
//! Signing is a capability supplied by a wallet the user controls. The
//! core deserializes envelope bytes just enough to hand the transaction
//! to that capability and never inspects, logs, or persists key material
//! obtained from it.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::VersionedTransaction;

use crate::error::{SolsticeError, SolsticeResult};
use crate::swap::builder::TransactionEnvelope;

/// Externally supplied signing capability
pub trait TransactionSigner {
    /// Public address of the signing identity (base58)
    fn address(&self) -> String;

    /// Sign a deserialized transaction. Implementations fail with
    /// `SigningRejected` when they decline or cannot sign.
    fn sign(&self, tx: VersionedTransaction) -> SolsticeResult<VersionedTransaction>;
}

/// Deserialize an envelope into a transaction.
/// Fails with `DeserializationFailed` if the bytes are not well-formed.
pub fn decode_envelope(envelope: &TransactionEnvelope) -> SolsticeResult<VersionedTransaction> {
    let bytes = BASE64.decode(&envelope.tx_base64)?;
    let tx: VersionedTransaction = bincode::deserialize(&bytes).map_err(|e| {
        SolsticeError::deserialization_failed(format!("Transaction does not parse: {}", e))
    })?;
    Ok(tx)
}

/// Run an envelope through the signing capability and return the signed
/// transaction as base64, ready for submission.
pub fn sign_envelope(
    signer: &dyn TransactionSigner,
    envelope: &TransactionEnvelope,
) -> SolsticeResult<String> {
    let tx = decode_envelope(envelope)?;
    let signed = signer.sign(tx)?;
    let bytes = bincode::serialize(&signed)?;
    Ok(BASE64.encode(bytes))
}

// =============================================================================
// Keypair-Backed Signer
// =============================================================================

/// A signing capability backed by a locally held keypair
pub struct KeypairSigner {
    keypair: Keypair,
}

impl KeypairSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Build a signer from the base58 64-byte (secret || public) encoding
    pub fn from_base58(encoded: &str) -> SolsticeResult<Self> {
        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| SolsticeError::invalid_input(format!("Invalid base58 key: {}", e)))?;
        let keypair = Keypair::from_bytes(&bytes)
            .map_err(|e| SolsticeError::invalid_input(format!("Invalid keypair: {}", e)))?;
        Ok(Self::new(keypair))
    }
}

impl TransactionSigner for KeypairSigner {
    fn address(&self) -> String {
        self.keypair.pubkey().to_string()
    }

    fn sign(&self, mut tx: VersionedTransaction) -> SolsticeResult<VersionedTransaction> {
        let num_required = tx.message.header().num_required_signatures as usize;
        let signer_keys = tx
            .message
            .static_account_keys()
            .get(..num_required)
            .ok_or_else(|| {
                SolsticeError::deserialization_failed("Transaction header names more signers than keys")
            })?;

        let position = signer_keys
            .iter()
            .position(|key| *key == self.keypair.pubkey())
            .ok_or_else(|| {
                SolsticeError::signing_rejected(format!(
                    "Wallet {} is not a required signer for this transaction",
                    self.address()
                ))
            })?;

        let message_bytes = tx.message.serialize();
        let signature = self
            .keypair
            .try_sign_message(&message_bytes)
            .map_err(|e| SolsticeError::signing_rejected(format!("Signing failed: {}", e)))?;

        if tx.signatures.len() < num_required {
            tx.signatures.resize(num_required, Signature::default());
        }
        tx.signatures[position] = signature;

        Ok(tx)
    }
}
