//! Swap Transaction Builder
//!
//! Turns a quote plus the signer's public address into an unsigned
//! transaction envelope via the Jupiter v6 swap endpoint.

use serde::{Deserialize, Serialize};

use crate::error::{SolsticeError, SolsticeResult};
use crate::swap::quote::{SwapQuote, SLIPPAGE_BPS};
use crate::utils;

/// Jupiter v6 swap endpoint
const JUPITER_SWAP_URL: &str = "https://quote-api.jup.ag/v6/swap";

/// Flat prioritization fee attached to every swap
const PRIORITIZATION_FEE_LAMPORTS: u64 = 10_000;

/// An unsigned transaction anchored to a validity window.
///
/// Produced by the builder, consumed once by the signer. The bytes stay
/// opaque here; only the signer deserializes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionEnvelope {
    /// Base64-encoded unsigned transaction bytes
    pub tx_base64: String,
    /// Reference blockhash the transaction is anchored to
    pub blockhash: String,
    /// Ledger height after which the transaction can no longer land
    pub last_valid_block_height: u64,
}

/// Request an unsigned swap transaction for `quote`, to be signed by
/// `signer_address`. The quote's route descriptor is posted back verbatim.
pub fn build(quote: &SwapQuote, signer_address: &str) -> SolsticeResult<TransactionEnvelope> {
    let body = serde_json::json!({
        "quoteResponse": quote.route,
        "userPublicKey": signer_address,
        "wrapAndUnwrapSol": true,
        "prioritizationFeeLamports": PRIORITIZATION_FEE_LAMPORTS,
        "slippageBps": SLIPPAGE_BPS,
    });

    let response = utils::post_json(JUPITER_SWAP_URL, &body)?;
    let status = response.status();
    let text = response.text().unwrap_or_default();

    if !status.is_success() {
        return Err(SolsticeError::build_failed(format!(
            "Swap API error: {}",
            status
        ))
        .with_details(text));
    }

    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| SolsticeError::parse_error(format!("Failed to parse swap response: {}", e)))?;

    parse_build_response(value)
}

/// Extract the envelope from the aggregator's swap response
pub fn parse_build_response(body: serde_json::Value) -> SolsticeResult<TransactionEnvelope> {
    let tx_base64 = body["swapTransaction"]
        .as_str()
        .ok_or_else(|| {
            SolsticeError::build_failed("Swap response did not contain a transaction")
                .with_details(body.to_string())
        })?
        .to_string();

    let last_valid_block_height = read_height(&body["lastValidBlockHeight"]).ok_or_else(|| {
        SolsticeError::build_failed("Swap response did not contain lastValidBlockHeight")
    })?;

    let blockhash = body["blockhash"].as_str().unwrap_or_default().to_string();

    Ok(TransactionEnvelope {
        tx_base64,
        blockhash,
        last_valid_block_height,
    })
}

fn read_height(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
