//! Balance Lookup
//!
//! Per-chain balance queries in the chain's smallest unit, with per-wallet
//! failure isolation: one wallet's failed lookup never blocks or corrupts
//! the others. Callers get a sentinel (`None`) for a failed lookup and the
//! session continues.

use serde::{Deserialize, Serialize};

use crate::error::{SolsticeError, SolsticeResult};
use crate::types::{format_base_units_trimmed, Chain, WalletRecord};
use crate::utils;

/// Ethereum RPC endpoints, tried in order
const ETH_RPC_ENDPOINTS: &[&str] = &[
    "https://eth.llamarpc.com",
    "https://ethereum.publicnode.com",
    "https://rpc.ankr.com/eth",
];

/// Solana mainnet RPC endpoint
const SOLANA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// SOL amount held back from max-spend for transaction fees
const SOL_FEE_RESERVE: f64 = 0.01;

// =============================================================================
// Per-Chain Lookups
// =============================================================================

/// Fetch the balance for a wallet in the chain's smallest unit
pub fn fetch_balance(record: &WalletRecord) -> SolsticeResult<u128> {
    match record.chain {
        Chain::Ethereum => fetch_eth_balance(&record.address),
        Chain::Solana => fetch_sol_balance(&record.address).map(u128::from),
    }
}

/// Fetch an Ethereum balance in wei, falling back across public RPCs
pub fn fetch_eth_balance(address: &str) -> SolsticeResult<u128> {
    let mut last_error = SolsticeError::balance_unavailable("All endpoints failed");

    for endpoint in ETH_RPC_ENDPOINTS {
        match fetch_eth_balance_single(address, endpoint) {
            Ok(balance) => return Ok(balance),
            Err(e) => last_error = e,
        }
    }

    Err(last_error)
}

fn fetch_eth_balance_single(address: &str, rpc_url: &str) -> SolsticeResult<u128> {
    #[derive(Serialize)]
    struct RpcRequest<'a> {
        jsonrpc: &'static str,
        method: &'static str,
        params: Vec<&'a str>,
        id: u32,
    }

    #[derive(Deserialize)]
    struct RpcResponse {
        result: Option<String>,
    }

    let response = utils::post_json(
        rpc_url,
        &RpcRequest {
            jsonrpc: "2.0",
            method: "eth_getBalance",
            params: vec![address, "latest"],
            id: 1,
        },
    )
    .map_err(|e| SolsticeError::balance_unavailable(e.to_string()))?;

    if !response.status().is_success() {
        return Err(SolsticeError::balance_unavailable("RPC returned error status"));
    }

    let result: RpcResponse = response
        .json()
        .map_err(|e| SolsticeError::parse_error(format!("Failed to parse RPC response: {}", e)))?;

    let hex_balance = result
        .result
        .ok_or_else(|| SolsticeError::balance_unavailable("No balance in response"))?;

    u128::from_str_radix(hex_balance.trim_start_matches("0x"), 16)
        .map_err(|e| SolsticeError::parse_error(format!("Invalid balance format: {}", e)))
}

/// Fetch a Solana balance in lamports
pub fn fetch_sol_balance(address: &str) -> SolsticeResult<u64> {
    #[derive(Serialize)]
    struct RpcRequest<'a> {
        jsonrpc: &'static str,
        id: u32,
        method: &'static str,
        params: Vec<&'a str>,
    }

    #[derive(Deserialize)]
    struct RpcResponse {
        result: Option<BalanceResult>,
    }

    #[derive(Deserialize)]
    struct BalanceResult {
        value: u64,
    }

    let response = utils::post_json(
        SOLANA_RPC_URL,
        &RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "getBalance",
            params: vec![address],
        },
    )
    .map_err(|e| SolsticeError::balance_unavailable(e.to_string()))?;

    if !response.status().is_success() {
        return Err(SolsticeError::balance_unavailable("RPC returned error status"));
    }

    let result: RpcResponse = response
        .json()
        .map_err(|e| SolsticeError::parse_error(format!("Failed to parse RPC response: {}", e)))?;

    result
        .result
        .map(|r| r.value)
        .ok_or_else(|| SolsticeError::balance_unavailable("No balance in response"))
}

// =============================================================================
// Aggregate Lookup
// =============================================================================

/// Fetch balances for a set of wallets concurrently.
///
/// Each lookup is independent; a failure yields `None` for that wallet
/// (the best-effort sentinel) without cancelling the others.
pub fn fetch_all(records: &[WalletRecord]) -> Vec<Option<u128>> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = records
            .iter()
            .map(|record| scope.spawn(move || fetch_balance(record).ok()))
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|_| None))
            .collect()
    })
}

// =============================================================================
// Display Helpers
// =============================================================================

/// Render a balance lookup result for a wallet row.
/// `None` is the sentinel for a failed lookup.
pub fn display_balance(chain: Chain, balance: Option<u128>) -> String {
    let Some(balance) = balance else {
        return "Error fetching balance".to_string();
    };

    match chain {
        Chain::Ethereum => {
            if balance == 0 {
                "0 ETH".to_string()
            } else {
                format!("{} ETH", format_base_units_trimmed(balance, 18))
            }
        }
        Chain::Solana => {
            let sol = balance as f64 / 1e9;
            format!("{:.4} SOL", sol)
        }
    }
}

/// Max spendable SOL: the full balance minus a fee reserve,
/// formatted to lamport precision
pub fn max_spendable_sol(balance_lamports: u64) -> String {
    let max = (balance_lamports as f64 / 1e9 - SOL_FEE_RESERVE).max(0.0);
    format!("{:.9}", max)
}
