//! Run-loop state machine.
//!
//! Two states: `Initializing` (derive + admit accounts) and `Running`
//! (cycle forever). `step()` advances exactly one transition or one
//! cycle and reports what happened; the caller decides how long to wait
//! before the next step, so pacing stays cancellable from the outside.
//!
//! The active-account set is owned by the `Running` state and replaced
//! wholesale on every fault — never mutated in place, never reused
//! across re-initializations.

use std::time::Duration;
use tracing::{error, info};

use crate::chain::ChainClient;
use crate::config::{AgentConfig, AppConfig};
use crate::engine::cycler::CycleExecutor;
use crate::types::{OperationSpec, SubmitOutcome};
use crate::wallet::{self, ActiveAccount, DeriveParams};

pub enum RunState {
    Initializing,
    Running {
        accounts: Vec<ActiveAccount>,
        cycle: u64,
    },
}

/// What one `step()` did, and therefore how the caller should pace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Accounts derived and admitted; ready to cycle immediately.
    Initialized { active: usize },
    /// Derivation succeeded but nothing met the balance threshold.
    /// Fatal for this attempt; retried after the re-init delay.
    NoActiveAccounts,
    /// Account initialization itself failed; retried after the delay.
    InitFailed,
    /// A cycle ran to completion (failures included — they don't stop
    /// the loop).
    CycleComplete { succeeded: usize, failed: usize },
    /// A fault escaped the cycle; the account set has been discarded.
    /// Transient connectivity faults re-initialize immediately, anything
    /// else after the re-init delay.
    Faulted { transient: bool },
}

impl StepOutcome {
    /// Delay to apply before the next step. `None` means go again now.
    pub fn pacing(&self, cfg: &AgentConfig) -> Option<Duration> {
        match self {
            StepOutcome::Initialized { .. } => None,
            StepOutcome::CycleComplete { .. } => {
                Some(Duration::from_secs(cfg.cycle_interval_secs))
            }
            StepOutcome::NoActiveAccounts | StepOutcome::InitFailed => {
                Some(Duration::from_secs(cfg.reinit_delay_secs))
            }
            StepOutcome::Faulted { transient: true } => None,
            StepOutcome::Faulted { transient: false } => {
                Some(Duration::from_secs(cfg.reinit_delay_secs))
            }
        }
    }
}

pub struct Supervisor {
    phrases: Vec<String>,
    accounts_per_seed: u32,
    min_balance: u128,
    prefix: String,
    balance_denom: String,
    ops: Vec<OperationSpec>,
    executor: CycleExecutor,
    state: RunState,
}

impl Supervisor {
    /// Seed phrases are read once at startup and held for the process
    /// lifetime; re-initialization re-derives from them.
    pub fn new(cfg: &AppConfig, phrases: Vec<String>, ops: Vec<OperationSpec>) -> Self {
        Self {
            phrases,
            accounts_per_seed: cfg.wallet.accounts_per_seed,
            min_balance: cfg.wallet.min_balance as u128,
            prefix: cfg.chain.address_prefix.clone(),
            balance_denom: cfg.chain.gas_denom.clone(),
            ops,
            executor: CycleExecutor::new(cfg.agent.serialize_per_account),
            state: RunState::Initializing,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, RunState::Running { .. })
    }

    /// Advance the state machine by one transition or one cycle.
    pub async fn step(&mut self, chain: &dyn ChainClient) -> StepOutcome {
        // Take ownership of the current state; a fault path simply never
        // puts the account set back.
        let state = std::mem::replace(&mut self.state, RunState::Initializing);

        match state {
            RunState::Initializing => self.initialize(chain).await,
            RunState::Running { accounts, cycle } => {
                let cycle = cycle + 1;
                let report = self
                    .executor
                    .run_cycle(chain, &accounts, &self.ops, cycle)
                    .await;

                if let Some(fault) = report.first_transient() {
                    if let SubmitOutcome::Failure { reason, .. } = &fault.outcome {
                        error!(
                            cycle,
                            error = %reason,
                            "Transient connectivity fault — discarding account set and re-initializing"
                        );
                    }
                    // `accounts` dropped here: wholesale discard
                    return StepOutcome::Faulted { transient: true };
                }

                let outcome = StepOutcome::CycleComplete {
                    succeeded: report.succeeded(),
                    failed: report.failed(),
                };
                self.state = RunState::Running { accounts, cycle };
                outcome
            }
        }
    }

    async fn initialize(&mut self, chain: &dyn ChainClient) -> StepOutcome {
        let params = DeriveParams {
            phrases: &self.phrases,
            accounts_per_seed: self.accounts_per_seed,
            min_balance: self.min_balance,
            prefix: &self.prefix,
            balance_denom: &self.balance_denom,
        };

        match wallet::init_accounts(chain, &params).await {
            Ok(accounts) if accounts.is_empty() => {
                error!(
                    min_balance = self.min_balance,
                    "No accounts met the balance threshold — nothing to run"
                );
                StepOutcome::NoActiveAccounts
            }
            Ok(accounts) => {
                let active = accounts.len();
                info!(active, operations = self.ops.len(), "Entering run state");
                self.state = RunState::Running { accounts, cycle: 0 };
                StepOutcome::Initialized { active }
            }
            Err(e) => {
                error!(error = %e, "Account initialization failed");
                StepOutcome::InitFailed
            }
        }
    }
}
