//! Transaction Submission and Confirmation
//!
//! Sends signed bytes to the network with preflight skipped and a bounded
//! retry count, then polls for finality inside the envelope's validity
//! window. An exhausted window is `ConfirmationExpired`; an on-chain
//! failure is `ConfirmationFailed` — callers must be able to tell them
//! apart.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{SolsticeError, SolsticeResult};
use crate::swap::builder::TransactionEnvelope;
use crate::utils;
use crate::utils::logging;

/// Solana mainnet RPC endpoint
const SOLANA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Submission attempts on transient transport failure
const MAX_SUBMIT_ATTEMPTS: u32 = 3;

/// Grace window past the envelope's last valid height before a pending
/// transaction is declared expired
const CONFIRMATION_GRACE_BLOCKS: u64 = 32;

/// Delay between confirmation polls. Fixed interval, no backoff.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

// =============================================================================
// Submission
// =============================================================================

/// Submit signed transaction bytes, retrying transport failures up to the
/// attempt bound. Returns the submission id (transaction signature).
pub fn submit(signed_base64: &str, envelope: &TransactionEnvelope) -> SolsticeResult<String> {
    let signature = submit_with_retry(MAX_SUBMIT_ATTEMPTS, |attempt| {
        if attempt > 1 {
            logging::warn("submitter", format!("Resubmitting, attempt {}", attempt)).log();
        }
        send_transaction_once(signed_base64)
    })?;

    logging::info("submitter", "Transaction submitted")
        .field("signature", &signature)
        .field("last_valid_height", envelope.last_valid_block_height)
        .log();

    Ok(signature)
}

/// Run `attempt_fn` up to `attempts` times, stopping early on success or
/// on a non-transient error. RPC-level rejection is terminal; only
/// transport failures are retried.
pub fn submit_with_retry<F>(attempts: u32, mut attempt_fn: F) -> SolsticeResult<String>
where
    F: FnMut(u32) -> SolsticeResult<String>,
{
    let mut last_error = SolsticeError::submission_failed("No submission attempts made");

    for attempt in 1..=attempts {
        match attempt_fn(attempt) {
            Ok(signature) => return Ok(signature),
            Err(e) if e.is_transient() => last_error = e,
            Err(e) => return Err(e),
        }
    }

    Err(SolsticeError::submission_failed(format!(
        "Submission failed after {} attempts",
        attempts
    ))
    .with_details(last_error.to_string()))
}

fn send_transaction_once(signed_base64: &str) -> SolsticeResult<String> {
    #[derive(Serialize)]
    struct RpcRequest {
        jsonrpc: &'static str,
        id: u32,
        method: &'static str,
        params: (String, SendOptions),
    }

    #[derive(Serialize)]
    struct SendOptions {
        encoding: &'static str,
        #[serde(rename = "skipPreflight")]
        skip_preflight: bool,
        #[serde(rename = "maxRetries")]
        max_retries: u32,
    }

    #[derive(Deserialize)]
    struct RpcResponse {
        result: Option<String>,
        error: Option<RpcError>,
    }

    #[derive(Deserialize)]
    struct RpcError {
        message: String,
    }

    let response = utils::post_json(
        SOLANA_RPC_URL,
        &RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "sendTransaction",
            params: (
                signed_base64.to_string(),
                SendOptions {
                    encoding: "base64",
                    skip_preflight: true,
                    max_retries: MAX_SUBMIT_ATTEMPTS,
                },
            ),
        },
    )?;

    if !response.status().is_success() {
        return Err(SolsticeError::network_error(format!(
            "RPC returned {}",
            response.status()
        )));
    }

    let result: RpcResponse = response
        .json()
        .map_err(|e| SolsticeError::parse_error(format!("Failed to parse RPC response: {}", e)))?;

    if let Some(error) = result.error {
        return Err(SolsticeError::submission_failed(error.message));
    }

    result
        .result
        .ok_or_else(|| SolsticeError::submission_failed("No signature in response"))
}

// =============================================================================
// Confirmation
// =============================================================================

/// Snapshot of a signature's status as reported by the network
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignatureStatus {
    /// On-chain error, if the transaction landed and failed
    pub err: Option<serde_json::Value>,
    #[serde(rename = "confirmationStatus")]
    pub confirmation_status: Option<String>,
}

/// Outcome of one confirmation poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Transaction reached a confirmed commitment level
    Confirmed,
    /// Transaction landed on chain and failed; carries the on-chain error
    Failed(String),
    /// Validity window exhausted without resolution
    Expired,
}

/// Decide the outcome of a poll, if any.
///
/// A landed transaction resolves first, even when the window has lapsed
/// in the meantime; only an unresolved signature past
/// `last_valid + CONFIRMATION_GRACE_BLOCKS` expires.
pub fn evaluate(
    status: Option<&SignatureStatus>,
    current_height: u64,
    last_valid_block_height: u64,
) -> Option<ConfirmOutcome> {
    if let Some(status) = status {
        if let Some(ref err) = status.err {
            return Some(ConfirmOutcome::Failed(err.to_string()));
        }
        if let Some(ref level) = status.confirmation_status {
            if level == "confirmed" || level == "finalized" {
                return Some(ConfirmOutcome::Confirmed);
            }
        }
    }

    if current_height > last_valid_block_height + CONFIRMATION_GRACE_BLOCKS {
        return Some(ConfirmOutcome::Expired);
    }

    None
}

/// Poll the network until the submission resolves inside its validity
/// window. The poll loop is bounded by the ledger height window, not a
/// retry count: every pass either resolves or moves the chain closer to
/// the expiry height.
pub fn confirm(signature: &str, envelope: &TransactionEnvelope) -> SolsticeResult<()> {
    loop {
        let status = get_signature_status(signature)?;
        let current_height = get_block_height()?;

        match evaluate(status.as_ref(), current_height, envelope.last_valid_block_height) {
            Some(ConfirmOutcome::Confirmed) => {
                logging::info("submitter", "Transaction confirmed")
                    .field("signature", signature)
                    .log();
                return Ok(());
            }
            Some(ConfirmOutcome::Failed(err)) => {
                return Err(SolsticeError::confirmation_failed(format!(
                    "Transaction failed on chain: {}",
                    err
                )));
            }
            Some(ConfirmOutcome::Expired) => {
                return Err(SolsticeError::confirmation_expired(format!(
                    "Validity window exceeded: height {} past last valid {} (+{})",
                    current_height,
                    envelope.last_valid_block_height,
                    CONFIRMATION_GRACE_BLOCKS
                )));
            }
            None => std::thread::sleep(POLL_INTERVAL),
        }
    }
}

/// Explorer link for a submitted transaction
pub fn explorer_url(signature: &str) -> String {
    format!("https://solscan.io/tx/{}", signature)
}

fn get_signature_status(signature: &str) -> SolsticeResult<Option<SignatureStatus>> {
    #[derive(Serialize)]
    struct RpcRequest<'a> {
        jsonrpc: &'static str,
        id: u32,
        method: &'static str,
        params: (Vec<&'a str>, StatusOptions),
    }

    #[derive(Serialize)]
    struct StatusOptions {
        #[serde(rename = "searchTransactionHistory")]
        search_transaction_history: bool,
    }

    #[derive(Deserialize)]
    struct RpcResponse {
        result: Option<StatusResult>,
    }

    #[derive(Deserialize)]
    struct StatusResult {
        value: Vec<Option<SignatureStatus>>,
    }

    let response = utils::post_json(
        SOLANA_RPC_URL,
        &RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "getSignatureStatuses",
            params: (
                vec![signature],
                StatusOptions {
                    search_transaction_history: false,
                },
            ),
        },
    )?;

    if !response.status().is_success() {
        return Err(SolsticeError::network_error(format!(
            "RPC returned {}",
            response.status()
        )));
    }

    let result: RpcResponse = response
        .json()
        .map_err(|e| SolsticeError::parse_error(format!("Failed to parse RPC response: {}", e)))?;

    Ok(result
        .result
        .and_then(|r| r.value.into_iter().next())
        .flatten())
}

fn get_block_height() -> SolsticeResult<u64> {
    #[derive(Serialize)]
    struct RpcRequest {
        jsonrpc: &'static str,
        id: u32,
        method: &'static str,
    }

    #[derive(Deserialize)]
    struct RpcResponse {
        result: Option<u64>,
    }

    let response = utils::post_json(
        SOLANA_RPC_URL,
        &RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "getBlockHeight",
        },
    )?;

    if !response.status().is_success() {
        return Err(SolsticeError::network_error(format!(
            "RPC returned {}",
            response.status()
        )));
    }

    let result: RpcResponse = response
        .json()
        .map_err(|e| SolsticeError::parse_error(format!("Failed to parse RPC response: {}", e)))?;

    result
        .result
        .ok_or_else(|| SolsticeError::network_error("No block height in response"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn pending() -> SignatureStatus {
        SignatureStatus {
            err: None,
            confirmation_status: Some("processed".to_string()),
        }
    }

    #[test]
    fn test_evaluate_confirmed() {
        for level in ["confirmed", "finalized"] {
            let status = SignatureStatus {
                err: None,
                confirmation_status: Some(level.to_string()),
            };
            assert_eq!(
                evaluate(Some(&status), 100, 200),
                Some(ConfirmOutcome::Confirmed)
            );
        }
    }

    #[test]
    fn test_evaluate_on_chain_failure() {
        let status = SignatureStatus {
            err: Some(serde_json::json!({"InstructionError": [0, "Custom"]})),
            confirmation_status: Some("confirmed".to_string()),
        };
        match evaluate(Some(&status), 100, 200) {
            Some(ConfirmOutcome::Failed(err)) => assert!(err.contains("InstructionError")),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_window_boundary_is_exclusive() {
        // At exactly last_valid + 32 the transaction can still land
        assert_eq!(evaluate(None, 232, 200), None);
        assert_eq!(evaluate(Some(&pending()), 232, 200), None);
        // One block past the grace window it expires
        assert_eq!(evaluate(None, 233, 200), Some(ConfirmOutcome::Expired));
    }

    #[test]
    fn test_expired_is_not_failed() {
        let outcome = evaluate(Some(&pending()), 300, 200).unwrap();
        assert_eq!(outcome, ConfirmOutcome::Expired);
        assert!(!matches!(outcome, ConfirmOutcome::Failed(_)));
    }

    #[test]
    fn test_landed_transaction_beats_lapsed_window() {
        let status = SignatureStatus {
            err: None,
            confirmation_status: Some("finalized".to_string()),
        };
        assert_eq!(
            evaluate(Some(&status), 500, 200),
            Some(ConfirmOutcome::Confirmed)
        );
    }

    #[test]
    fn test_retry_bounded_at_three_attempts() {
        let mut calls = 0;
        let err = submit_with_retry(MAX_SUBMIT_ATTEMPTS, |_| {
            calls += 1;
            Err(SolsticeError::network_error("connection reset"))
        })
        .unwrap_err();

        assert_eq!(calls, 3);
        assert_eq!(err.code, ErrorCode::SubmissionFailed);
    }

    #[test]
    fn test_retry_recovers_from_transient_failure() {
        let mut calls = 0;
        let signature = submit_with_retry(MAX_SUBMIT_ATTEMPTS, |attempt| {
            calls += 1;
            if attempt < 2 {
                Err(SolsticeError::network_error("connection reset"))
            } else {
                Ok("5sig".to_string())
            }
        })
        .unwrap();

        assert_eq!(calls, 2);
        assert_eq!(signature, "5sig");
    }

    #[test]
    fn test_rpc_rejection_not_retried() {
        let mut calls = 0;
        let err = submit_with_retry(MAX_SUBMIT_ATTEMPTS, |_| {
            calls += 1;
            Err(SolsticeError::submission_failed("Blockhash not found"))
        })
        .unwrap_err();

        assert_eq!(calls, 1);
        assert_eq!(err.code, ErrorCode::SubmissionFailed);
    }
}
