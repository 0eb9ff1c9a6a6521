//! Cycle executor.
//!
//! Submits one contract execution per (active account, operation spec)
//! pair and collects every outcome independently. Accounts always fan
//! out concurrently; an account's own operations run sequentially or
//! concurrently depending on the serialization policy. Isolation is
//! total — a failed pair never aborts or affects its siblings, and the
//! fan-out always waits for every pair to settle.

use chrono::Utc;
use futures::future::join_all;
use tracing::{info, warn};

use crate::chain::ChainClient;
use crate::types::{CycleReport, CycleResult, OperationSpec, SubmitOutcome};
use crate::wallet::ActiveAccount;

pub struct CycleExecutor {
    /// When set, one account's submissions within a cycle run in
    /// operation order instead of racing for the same sequence number.
    serialize_per_account: bool,
}

impl CycleExecutor {
    pub fn new(serialize_per_account: bool) -> Self {
        Self {
            serialize_per_account,
        }
    }

    /// Run one full cycle: every account × every operation.
    ///
    /// Produces exactly one `CycleResult` (and one log line) per pair,
    /// success or failure.
    pub async fn run_cycle(
        &self,
        chain: &dyn ChainClient,
        accounts: &[ActiveAccount],
        ops: &[OperationSpec],
        cycle_number: u64,
    ) -> CycleReport {
        let started_at = Utc::now();
        info!(
            cycle = cycle_number,
            accounts = accounts.len(),
            operations = ops.len(),
            "Starting cycle"
        );

        let per_account = accounts
            .iter()
            .map(|account| self.submit_account_ops(chain, account, ops, cycle_number));
        let results: Vec<CycleResult> = join_all(per_account).await.into_iter().flatten().collect();

        let report = CycleReport {
            cycle_number,
            started_at,
            results,
        };
        info!(
            cycle = cycle_number,
            submitted = report.results.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Cycle complete"
        );
        report
    }

    /// All of one account's submissions for this cycle.
    async fn submit_account_ops(
        &self,
        chain: &dyn ChainClient,
        account: &ActiveAccount,
        ops: &[OperationSpec],
        cycle_number: u64,
    ) -> Vec<CycleResult> {
        if self.serialize_per_account {
            let mut results = Vec::with_capacity(ops.len());
            for op in ops {
                results.push(submit_one(chain, account, op, cycle_number).await);
            }
            results
        } else {
            join_all(
                ops.iter()
                    .map(|op| submit_one(chain, account, op, cycle_number)),
            )
            .await
        }
    }
}

/// One (account, operation) submission, with its unconditional log line.
async fn submit_one(
    chain: &dyn ChainClient,
    account: &ActiveAccount,
    op: &OperationSpec,
    cycle_number: u64,
) -> CycleResult {
    let outcome = match chain.execute_contract(&account.identity, op).await {
        Ok(receipt) => {
            info!(
                cycle = cycle_number,
                account = %account.short_address(),
                op = %op.memo,
                tx = %receipt.short_hash(),
                "Submission confirmed"
            );
            SubmitOutcome::Success(receipt)
        }
        Err(e) => {
            warn!(
                cycle = cycle_number,
                account = %account.short_address(),
                op = %op.memo,
                error = %e.summary(),
                "Submission failed"
            );
            SubmitOutcome::Failure {
                reason: e.summary(),
                transient: e.is_transient(),
            }
        }
    };

    CycleResult {
        account_index: account.identity.index,
        address: account.identity.address.clone(),
        memo: op.memo.clone(),
        outcome,
    }
}
