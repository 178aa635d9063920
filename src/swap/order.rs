//! Swap Order State Machine
//!
//! One `SwapOrder` per user-initiated swap attempt, coordinating quote,
//! build, sign, submit and confirm into a single auditable lifecycle.
//! Terminal states are final; transition guards make illegal shortcuts
//! (submitting an unsigned envelope, confirming before submission)
//! impossible rather than merely unlikely.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, SolsticeError, SolsticeResult};
use crate::swap::builder::{self, TransactionEnvelope};
use crate::swap::quote::{QuoteClient, SwapQuote};
use crate::swap::signer::{sign_envelope, TransactionSigner};
use crate::swap::submitter;
use crate::utils::logging;

/// Lifecycle states of a swap order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    Idle,
    Quoting,
    Quoted,
    Building,
    Built,
    AwaitingSignature,
    Signed,
    Submitting,
    Submitted,
    Confirming,
    Confirmed,
    Failed,
    Expired,
}

impl OrderState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderState::Confirmed | OrderState::Failed | OrderState::Expired
        )
    }
}

/// A single swap attempt
#[derive(Debug)]
pub struct SwapOrder {
    state: OrderState,
    quote: Option<SwapQuote>,
    envelope: Option<TransactionEnvelope>,
    signed_tx_base64: Option<String>,
    submission_id: Option<String>,
    submit_attempts: u32,
}

impl Default for SwapOrder {
    fn default() -> Self {
        Self::new()
    }
}

impl SwapOrder {
    pub fn new() -> Self {
        Self {
            state: OrderState::Idle,
            quote: None,
            envelope: None,
            signed_tx_base64: None,
            submission_id: None,
            submit_attempts: 0,
        }
    }

    pub fn state(&self) -> OrderState {
        self.state
    }

    pub fn quote(&self) -> Option<&SwapQuote> {
        self.quote.as_ref()
    }

    pub fn envelope(&self) -> Option<&TransactionEnvelope> {
        self.envelope.as_ref()
    }

    pub fn submission_id(&self) -> Option<&str> {
        self.submission_id.as_deref()
    }

    /// How many times this order entered Submitting
    pub fn submit_attempts(&self) -> u32 {
        self.submit_attempts
    }

    // -------------------------------------------------------------------------
    // Guarded transitions
    // -------------------------------------------------------------------------

    pub fn begin_quote(&mut self) -> SolsticeResult<()> {
        self.expect(OrderState::Idle, "begin quoting")?;
        self.state = OrderState::Quoting;
        Ok(())
    }

    pub fn quote_ready(&mut self, quote: SwapQuote) -> SolsticeResult<()> {
        self.expect(OrderState::Quoting, "accept quote")?;
        self.quote = Some(quote);
        self.state = OrderState::Quoted;
        Ok(())
    }

    pub fn begin_build(&mut self) -> SolsticeResult<()> {
        self.expect(OrderState::Quoted, "begin building")?;
        self.state = OrderState::Building;
        Ok(())
    }

    pub fn build_ready(&mut self, envelope: TransactionEnvelope) -> SolsticeResult<()> {
        self.expect(OrderState::Building, "accept envelope")?;
        // At most one outstanding envelope per order
        self.envelope = Some(envelope);
        self.state = OrderState::Built;
        Ok(())
    }

    pub fn request_signature(&mut self) -> SolsticeResult<()> {
        self.expect(OrderState::Built, "request signature")?;
        self.state = OrderState::AwaitingSignature;
        Ok(())
    }

    pub fn signature_ready(&mut self, signed_tx_base64: String) -> SolsticeResult<()> {
        self.expect(OrderState::AwaitingSignature, "accept signature")?;
        self.signed_tx_base64 = Some(signed_tx_base64);
        self.state = OrderState::Signed;
        Ok(())
    }

    /// Submitting is only reachable from Signed; an unsigned envelope can
    /// never be submitted.
    pub fn begin_submit(&mut self) -> SolsticeResult<&str> {
        self.expect(OrderState::Signed, "begin submission")?;
        let signed = self
            .signed_tx_base64
            .as_deref()
            .ok_or_else(|| SolsticeError::invalid_state("No signed transaction to submit"))?;
        self.state = OrderState::Submitting;
        self.submit_attempts += 1;
        Ok(signed)
    }

    pub fn submitted(&mut self, submission_id: String) -> SolsticeResult<()> {
        self.expect(OrderState::Submitting, "record submission")?;
        self.submission_id = Some(submission_id);
        self.state = OrderState::Submitted;
        Ok(())
    }

    /// Confirming is only reachable from Submitted
    pub fn begin_confirm(&mut self) -> SolsticeResult<()> {
        self.expect(OrderState::Submitted, "begin confirmation")?;
        self.state = OrderState::Confirming;
        Ok(())
    }

    pub fn confirmed(&mut self) -> SolsticeResult<()> {
        self.expect(OrderState::Confirming, "confirm")?;
        self.state = OrderState::Confirmed;
        Ok(())
    }

    /// Terminal failure; allowed from any non-terminal state
    pub fn failed(&mut self) -> SolsticeResult<()> {
        self.expect_not_terminal("fail")?;
        self.state = OrderState::Failed;
        Ok(())
    }

    /// Terminal expiry; allowed from any non-terminal state, distinct
    /// from `failed`
    pub fn expired(&mut self) -> SolsticeResult<()> {
        self.expect_not_terminal("expire")?;
        self.state = OrderState::Expired;
        Ok(())
    }

    /// An amount edit after quoting re-enters Quoting and invalidates any
    /// in-flight envelope for this order: the old transaction must never
    /// be submitted.
    pub fn edit_amount(&mut self) -> SolsticeResult<()> {
        self.expect_not_terminal("edit amount")?;
        self.quote = None;
        self.envelope = None;
        self.signed_tx_base64 = None;
        self.submission_id = None;
        self.state = OrderState::Quoting;
        Ok(())
    }

    fn expect(&self, expected: OrderState, action: &str) -> SolsticeResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SolsticeError::invalid_state(format!(
                "Cannot {} from {:?} (requires {:?})",
                action, self.state, expected
            )))
        }
    }

    fn expect_not_terminal(&self, action: &str) -> SolsticeResult<()> {
        if self.state.is_terminal() {
            Err(SolsticeError::invalid_state(format!(
                "Cannot {} a finished order ({:?})",
                action, self.state
            )))
        } else {
            Ok(())
        }
    }
}

// =============================================================================
// Lifecycle Orchestration
// =============================================================================

/// Drive one full swap for a human decimal amount. Returns the submission
/// id on success; on failure the order lands in Failed, or Expired when
/// the confirmation window lapsed.
pub fn execute(
    order: &mut SwapOrder,
    client: &QuoteClient,
    signer: &dyn TransactionSigner,
    amount: &str,
) -> SolsticeResult<String> {
    match run_lifecycle(order, client, signer, amount) {
        Ok(signature) => Ok(signature),
        Err(e) => {
            // A finished order stays finished; the guard error is ignored
            let _ = if e.code == ErrorCode::ConfirmationExpired {
                order.expired()
            } else {
                order.failed()
            };
            logging::error("swap", "Swap did not complete")
                .field("code", format!("{:?}", e.code))
                .field("reason", &e.message)
                .log();
            Err(e)
        }
    }
}

fn run_lifecycle(
    order: &mut SwapOrder,
    client: &QuoteClient,
    signer: &dyn TransactionSigner,
    amount: &str,
) -> SolsticeResult<String> {
    order.begin_quote()?;
    let quote = client.quote(amount)?;
    logging::info("swap", "Quote received")
        .field("out_amount", quote.out_amount_display())
        .field("generation", quote.generation)
        .log();
    order.quote_ready(quote.clone())?;

    order.begin_build()?;
    let envelope = builder::build(&quote, &signer.address())?;
    order.build_ready(envelope.clone())?;

    order.request_signature()?;
    let signed = sign_envelope(signer, &envelope)?;
    order.signature_ready(signed)?;

    let signed = order.begin_submit()?.to_string();
    let signature = submitter::submit(&signed, &envelope)?;
    order.submitted(signature.clone())?;

    order.begin_confirm()?;
    submitter::confirm(&signature, &envelope)?;
    order.confirmed()?;

    logging::info("swap", "Swap confirmed")
        .field("explorer", submitter::explorer_url(&signature))
        .log();

    Ok(signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swap::quote::parse_quote_response;

    fn test_quote(generation: u64) -> SwapQuote {
        let body = serde_json::json!({
            "inAmount": "1000000000",
            "outAmount": "150000000",
            "routePlan": [],
        });
        parse_quote_response(body, generation).unwrap()
    }

    fn test_envelope() -> TransactionEnvelope {
        TransactionEnvelope {
            tx_base64: "AQAAAA==".to_string(),
            blockhash: "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM".to_string(),
            last_valid_block_height: 250,
        }
    }

    fn order_in_signed_state() -> SwapOrder {
        let mut order = SwapOrder::new();
        order.begin_quote().unwrap();
        order.quote_ready(test_quote(1)).unwrap();
        order.begin_build().unwrap();
        order.build_ready(test_envelope()).unwrap();
        order.request_signature().unwrap();
        order.signature_ready("c2lnbmVk".to_string()).unwrap();
        order
    }

    #[test]
    fn test_full_lifecycle_walk() {
        let mut order = order_in_signed_state();
        order.begin_submit().unwrap();
        order.submitted("5sig".to_string()).unwrap();
        order.begin_confirm().unwrap();
        order.confirmed().unwrap();

        assert_eq!(order.state(), OrderState::Confirmed);
        assert!(order.state().is_terminal());
        assert_eq!(order.submission_id(), Some("5sig"));
        assert_eq!(order.submit_attempts(), 1);
    }

    #[test]
    fn test_submit_requires_signed_state() {
        let mut order = SwapOrder::new();
        order.begin_quote().unwrap();
        order.quote_ready(test_quote(1)).unwrap();
        order.begin_build().unwrap();
        order.build_ready(test_envelope()).unwrap();
        order.request_signature().unwrap();

        // Still awaiting signature: submission must be rejected
        let err = order.begin_submit().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
        assert_eq!(order.state(), OrderState::AwaitingSignature);
    }

    #[test]
    fn test_confirm_requires_submitted_state() {
        let mut order = order_in_signed_state();
        let err = order.begin_confirm().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
    }

    #[test]
    fn test_edit_amount_invalidates_envelope() {
        let mut order = order_in_signed_state();
        assert!(order.envelope().is_some());

        order.edit_amount().unwrap();

        assert_eq!(order.state(), OrderState::Quoting);
        assert!(order.envelope().is_none());
        assert!(order.quote().is_none());
        // The invalidated transaction can never be submitted
        assert!(order.begin_submit().is_err());
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut order = order_in_signed_state();
        order.failed().unwrap();
        assert_eq!(order.state(), OrderState::Failed);

        assert!(order.begin_quote().is_err());
        assert!(order.edit_amount().is_err());
        assert!(order.expired().is_err());
        assert_eq!(order.state(), OrderState::Failed);
    }

    #[test]
    fn test_expired_and_failed_are_distinct_terminals() {
        let mut failed = order_in_signed_state();
        failed.failed().unwrap();

        let mut expired = order_in_signed_state();
        expired.expired().unwrap();

        assert_ne!(failed.state(), expired.state());
        assert!(failed.state().is_terminal());
        assert!(expired.state().is_terminal());
    }

    #[test]
    fn test_idle_order_cannot_skip_ahead() {
        let mut order = SwapOrder::new();
        assert!(order.begin_build().is_err());
        assert!(order.begin_submit().is_err());
        assert!(order.confirmed().is_err());
        assert_eq!(order.state(), OrderState::Idle);
    }
}
