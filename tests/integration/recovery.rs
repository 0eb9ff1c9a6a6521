//! Run-loop state machine: initialization, cycling, fault recovery.

use cadence::chain::ChainError;
use cadence::config::{
    AgentConfig, AppConfig, ChainConfig, OperationsConfig, ProvideLiquidityConfig, SwapConfig,
    WalletConfig,
};
use cadence::engine::supervisor::{StepOutcome, Supervisor};
use cadence::ops;

use crate::mock_chain::{address_at, MockChain, TEST_MNEMONIC};

const CONTRACT: &str = "zig15jqg0hmp9n06q0as7uk3x9xkwr9k3r7yh4ww2uc0hek8zlryrgmsamk4qg";

fn app_config() -> AppConfig {
    AppConfig {
        agent: AgentConfig {
            name: "CADENCE-TEST".into(),
            cycle_interval_secs: 5,
            reinit_delay_secs: 10,
            serialize_per_account: true,
        },
        chain: ChainConfig {
            rpc_endpoint_env: "RPC_ENDPOINT".into(),
            address_prefix: "zig".into(),
            gas_denom: "uzig".into(),
            gas_price: 0.025,
            gas_limit: 500_000,
        },
        wallet: WalletConfig {
            seed_file: "seed.txt".into(),
            accounts_per_seed: 2,
            min_balance: 100_000,
        },
        operations: OperationsConfig {
            provide_liquidity: ProvideLiquidityConfig {
                enabled: false,
                contract: CONTRACT.into(),
                memo: "Add LP".into(),
                asset_a_denom: "uoro".into(),
                asset_a_amount: "10".into(),
                asset_b_denom: "uzig".into(),
                asset_b_amount: "12".into(),
                slippage_tolerance: "0.5".into(),
                auto_stake: true,
            },
            swap_a_to_b: SwapConfig {
                enabled: true,
                contract: CONTRACT.into(),
                memo: "Swap ZIG -> ORO".into(),
                offer_denom: "uzig".into(),
                offer_amount: "2000".into(),
                belief_price: "1.255492780916509732".into(),
                max_spread: "0.005".into(),
            },
            swap_b_to_a: SwapConfig {
                enabled: true,
                contract: CONTRACT.into(),
                memo: "Swap ORO -> ZIG".into(),
                offer_denom: "uoro".into(),
                offer_amount: "1500".into(),
                belief_price: "0.797448165869218517".into(),
                max_spread: "0.005".into(),
            },
        },
    }
}

fn supervisor(cfg: &AppConfig) -> Supervisor {
    let specs = ops::build_operations(&cfg.operations).unwrap();
    Supervisor::new(cfg, vec![TEST_MNEMONIC.to_string()], specs)
}

fn fund_all(chain: &MockChain, per_seed: u32) {
    for i in 0..per_seed {
        chain.set_balance(&address_at(i), 500_000);
    }
}

#[tokio::test]
async fn test_initialize_then_cycle() {
    let cfg = app_config();
    let chain = MockChain::new();
    fund_all(&chain, cfg.wallet.accounts_per_seed);

    let mut supervisor = supervisor(&cfg);
    assert!(!supervisor.is_running());

    let outcome = supervisor.step(&chain).await;
    assert_eq!(outcome, StepOutcome::Initialized { active: 2 });
    assert!(supervisor.is_running());

    let outcome = supervisor.step(&chain).await;
    // 2 accounts × 2 swaps, all succeed
    assert_eq!(outcome, StepOutcome::CycleComplete { succeeded: 4, failed: 0 });
    assert!(supervisor.is_running());
}

#[tokio::test]
async fn test_empty_active_set_is_fatal_for_the_attempt() {
    let cfg = app_config();
    let chain = MockChain::new(); // no balances at all

    let mut supervisor = supervisor(&cfg);
    let outcome = supervisor.step(&chain).await;
    assert_eq!(outcome, StepOutcome::NoActiveAccounts);
    assert!(!supervisor.is_running());
}

#[tokio::test]
async fn test_transport_fault_reinitializes_and_resumes() {
    let cfg = app_config();
    let chain = MockChain::new();
    fund_all(&chain, cfg.wallet.accounts_per_seed);

    let mut supervisor = supervisor(&cfg);
    assert_eq!(supervisor.step(&chain).await, StepOutcome::Initialized { active: 2 });

    // The node goes away mid-run
    chain.set_error(ChainError::Transport("connection reset by peer".into()));
    let outcome = supervisor.step(&chain).await;
    assert_eq!(outcome, StepOutcome::Faulted { transient: true });
    // Account state discarded wholesale
    assert!(!supervisor.is_running());

    // Node comes back; the supervisor re-derives and resumes cycling
    // without an external restart
    chain.clear_error();
    assert_eq!(supervisor.step(&chain).await, StepOutcome::Initialized { active: 2 });
    assert_eq!(
        supervisor.step(&chain).await,
        StepOutcome::CycleComplete { succeeded: 4, failed: 0 }
    );
}

#[tokio::test]
async fn test_rejections_keep_the_loop_running() {
    let cfg = app_config();
    let chain = MockChain::new();
    fund_all(&chain, cfg.wallet.accounts_per_seed);

    let mut supervisor = supervisor(&cfg);
    supervisor.step(&chain).await;

    // One account's swap keeps getting rejected by the contract —
    // an execution failure, not a connectivity fault
    chain.fail_pair(
        &address_at(0),
        "Swap ZIG -> ORO",
        ChainError::Rejected { code: 5, log: "insufficient funds".into() },
    );

    let outcome = supervisor.step(&chain).await;
    assert_eq!(outcome, StepOutcome::CycleComplete { succeeded: 3, failed: 1 });
    assert!(supervisor.is_running());

    // And the next cycle proceeds with the same account set
    let outcome = supervisor.step(&chain).await;
    assert_eq!(outcome, StepOutcome::CycleComplete { succeeded: 3, failed: 1 });
}
