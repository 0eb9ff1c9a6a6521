//! Shared types for the CADENCE bot.
//!
//! These types form the data model used across all modules: the
//! operation specs built at startup, and the per-cycle results the
//! executor produces. Everything here is ephemeral — produced, logged,
//! and dropped; nothing is persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Coins and operations
// ---------------------------------------------------------------------------

/// A native-token amount attached to a contract call.
///
/// Amounts are decimal strings in the smallest denomination unit, exactly
/// as they travel on the wire — they are never parsed or re-scaled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoinSpec {
    pub denom: String,
    pub amount: String,
}

impl fmt::Display for CoinSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// One fully-specified contract execution: built once from configuration
/// at startup, validated, then submitted unchanged every cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSpec {
    /// Short human label, also used as the transaction memo.
    pub memo: String,
    /// Bech32 address of the target contract.
    pub contract: String,
    /// Execute-message payload (JSON, CosmWasm pair-contract schema).
    pub msg: serde_json::Value,
    /// Funds attached to the call.
    pub funds: Vec<CoinSpec>,
}

// ---------------------------------------------------------------------------
// Submission results
// ---------------------------------------------------------------------------

/// Reference to a broadcast transaction.
#[derive(Debug, Clone)]
pub struct TxReceipt {
    /// Hex-encoded transaction hash.
    pub hash: String,
    pub timestamp: DateTime<Utc>,
}

impl TxReceipt {
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            timestamp: Utc::now(),
        }
    }

    /// Truncated hash for log display (first 10 characters).
    pub fn short_hash(&self) -> String {
        truncate(&self.hash, 10)
    }
}

/// Outcome of a single (account, operation) submission.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Success(TxReceipt),
    Failure {
        /// First line of the underlying error.
        reason: String,
        /// Whether the failure looked like a connectivity problem
        /// (drives run-loop re-initialization).
        transient: bool,
    },
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Success(_))
    }
}

/// Per-(account, operation) result for one cycle.
#[derive(Debug, Clone)]
pub struct CycleResult {
    pub account_index: u32,
    /// Full bech32 address of the submitting account.
    pub address: String,
    pub memo: String,
    pub outcome: SubmitOutcome,
}

impl fmt::Display for CycleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            SubmitOutcome::Success(receipt) => write!(
                f,
                "{} | {} | tx {}",
                short_address(&self.address),
                self.memo,
                receipt.short_hash(),
            ),
            SubmitOutcome::Failure { reason, .. } => write!(
                f,
                "{} | {} | failed: {}",
                short_address(&self.address),
                self.memo,
                reason,
            ),
        }
    }
}

/// Aggregated outcome of one full cycle across all active accounts.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle_number: u64,
    pub started_at: DateTime<Utc>,
    pub results: Vec<CycleResult>,
}

impl CycleReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    /// First transient failure in this cycle, if any. A transient failure
    /// is promoted to a run-level fault once the whole fan-out has settled.
    pub fn first_transient(&self) -> Option<&CycleResult> {
        self.results.iter().find(|r| {
            matches!(r.outcome, SubmitOutcome::Failure { transient: true, .. })
        })
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Truncated address for log display: `zig1...k4qg` (first 4 + last 4).
pub fn short_address(address: &str) -> String {
    if address.len() <= 8 {
        return address.to_string();
    }
    format!("{}...{}", &address[..4], &address[address.len() - 4..])
}

/// First line of a (possibly multi-line) error message.
pub fn first_line(message: &str) -> String {
    message.lines().next().unwrap_or("").trim().to_string()
}

fn truncate(s: &str, len: usize) -> String {
    if s.len() <= len {
        s.to_string()
    } else {
        s[..len].to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
