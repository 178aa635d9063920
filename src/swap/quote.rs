//! Swap Quote Client
//!
//! Fetches SOL -> USDC quotes from the Jupiter v6 aggregator, fixed to a
//! single direct route at 50 bps slippage.
//!
//! Rapid amount edits can leave several quote requests in flight at once.
//! Every request is tagged with a generation counter and a response may
//! only update displayed output if no newer generation has been applied;
//! stale responses are dropped silently.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{SolsticeError, SolsticeResult};
use crate::types::{decimal_to_base_units, format_base_units};
use crate::utils;

/// Wrapped SOL mint
pub const INPUT_MINT: &str = "So11111111111111111111111111111111111111112";
/// USDC mint
pub const OUTPUT_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

/// SOL decimals (lamports)
pub const INPUT_DECIMALS: u8 = 9;
/// USDC decimals
pub const OUTPUT_DECIMALS: u8 = 6;

/// Slippage tolerance in basis points
pub const SLIPPAGE_BPS: u16 = 50;

/// Jupiter v6 quote endpoint
const JUPITER_QUOTE_URL: &str = "https://quote-api.jup.ag/v6/quote";

/// A priced conversion for one input amount.
///
/// Immutable: a newer quote supersedes an older one, never mutates it.
/// `route` is the aggregator's full quote response, passed through to the
/// build step verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapQuote {
    pub input_mint: String,
    pub output_mint: String,
    /// Input amount in base units (lamports)
    pub in_amount: u64,
    /// Quoted output amount in base units
    pub out_amount: u64,
    pub slippage_bps: u16,
    /// Opaque route descriptor from the aggregator
    pub route: serde_json::Value,
    /// Per-session ordering tag
    pub generation: u64,
}

impl SwapQuote {
    /// Output amount rendered at the output asset's full precision
    pub fn out_amount_display(&self) -> String {
        format_base_units(self.out_amount, OUTPUT_DECIMALS)
    }
}

/// Jupiter quote client with per-session response ordering
#[derive(Debug, Default)]
pub struct QuoteClient {
    next_generation: AtomicU64,
    highest_applied: AtomicU64,
}

impl QuoteClient {
    pub fn new() -> Self {
        Self {
            next_generation: AtomicU64::new(0),
            highest_applied: AtomicU64::new(0),
        }
    }

    /// Fetch a quote for a human decimal SOL amount.
    ///
    /// Fails with `InvalidInput` before any request leaves the process if
    /// the amount is not a positive finite number, and `QuoteUnavailable`
    /// when the aggregator responds without a usable output amount.
    pub fn quote(&self, amount: &str) -> SolsticeResult<SwapQuote> {
        let lamports = decimal_to_base_units(amount, INPUT_DECIMALS)?;
        let generation = self.next_generation();

        let url = format!(
            "{}?inputMint={}&outputMint={}&amount={}&slippageBps={}&onlyDirectRoutes=true&asLegacyTransaction=true",
            JUPITER_QUOTE_URL, INPUT_MINT, OUTPUT_MINT, lamports, SLIPPAGE_BPS,
        );

        let response = utils::get(&url)?;
        let status = response.status();
        if !status.is_success() {
            return Err(SolsticeError::quote_unavailable(format!(
                "Quote API error: {}",
                status
            )));
        }

        let body: serde_json::Value = response
            .json()
            .map_err(|e| SolsticeError::parse_error(format!("Failed to parse quote: {}", e)))?;

        parse_quote_response(body, generation)
    }

    /// Allocate the next request generation (strictly increasing)
    pub fn next_generation(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Try to apply a quote to displayed output.
    ///
    /// Returns the display string when this quote is the freshest seen so
    /// far, or `None` when a newer generation was already applied — the
    /// stale result must be discarded, not rendered.
    pub fn apply(&self, quote: &SwapQuote) -> Option<String> {
        let previous = self
            .highest_applied
            .fetch_max(quote.generation, Ordering::SeqCst);
        if quote.generation >= previous {
            Some(quote.out_amount_display())
        } else {
            None
        }
    }

    /// Highest generation applied so far
    pub fn highest_applied(&self) -> u64 {
        self.highest_applied.load(Ordering::SeqCst)
    }
}

/// Parse the aggregator's quote body into a `SwapQuote`.
///
/// Jupiter encodes amounts as decimal strings; tolerate plain numbers too.
pub fn parse_quote_response(body: serde_json::Value, generation: u64) -> SolsticeResult<SwapQuote> {
    let out_amount = read_amount(&body["outAmount"]).ok_or_else(|| {
        SolsticeError::quote_unavailable("Quote response did not contain outAmount")
    })?;
    let in_amount = read_amount(&body["inAmount"]).unwrap_or(0);

    Ok(SwapQuote {
        input_mint: INPUT_MINT.to_string(),
        output_mint: OUTPUT_MINT.to_string(),
        in_amount,
        out_amount,
        slippage_bps: SLIPPAGE_BPS,
        route: body,
        generation,
    })
}

fn read_amount(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::String(s) => s.parse().ok(),
        serde_json::Value::Number(n) => n.as_u64(),
        _ => None,
    }
}
