//! Chain access layer.
//!
//! Defines the `ChainClient` trait — the seam between the bot and the
//! blockchain — plus the typed error taxonomy the run loop switches on.
//! The production implementation lives in [`rpc`]; tests substitute an
//! in-memory mock.

pub mod rpc;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{first_line, OperationSpec, TxReceipt};
use crate::wallet::AccountIdentity;

/// Errors from balance queries and contract executions.
///
/// Classification happens here, at the client boundary, so callers branch
/// on the kind rather than inspecting message text.
#[derive(Debug, Clone, Error)]
pub enum ChainError {
    /// The node did not answer in time. Recoverable by re-initializing
    /// immediately.
    #[error("connection timed out: {0}")]
    Timeout(String),

    /// Request-level transport failure (connection refused/reset, DNS, TLS).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The node answered but the query itself failed.
    #[error("query failed: {0}")]
    Query(String),

    /// The transaction was broadcast and rejected by the chain.
    #[error("transaction rejected (code {code}): {log}")]
    Rejected { code: u32, log: String },

    /// Locally malformed input (bad address, bad denom, unparsable amount).
    #[error("malformed request: {0}")]
    Malformed(String),
}

impl ChainError {
    /// Whether this error looks like transient connectivity trouble, in
    /// which case the run loop discards all account state and
    /// re-initializes without extra delay.
    pub fn is_transient(&self) -> bool {
        matches!(self, ChainError::Timeout(_) | ChainError::Transport(_))
    }

    /// First line of the error, for one-line log output.
    pub fn summary(&self) -> String {
        first_line(&self.to_string())
    }
}

/// Abstraction over the remote node connection.
///
/// Implementors own transport, signing, and wire encoding; the bot only
/// decides when to call and with what parameters.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current balance of `denom` held by `address`, in the smallest unit.
    async fn native_balance(&self, address: &str, denom: &str) -> Result<u128, ChainError>;

    /// Sign and broadcast one contract execution on behalf of `account`.
    async fn execute_contract(
        &self,
        account: &AccountIdentity,
        op: &OperationSpec,
    ) -> Result<TxReceipt, ChainError>;

    /// Endpoint identifier for logging.
    fn endpoint(&self) -> &str;
}
