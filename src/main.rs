//! CADENCE — Autonomous AMM Liquidity & Swap Cycler
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds the operation specs, connects to the chain, and runs the
//! derive→cycle loop with graceful shutdown.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{error, info};

use cadence::chain::rpc::CosmosRpcClient;
use cadence::config::AppConfig;
use cadence::engine::supervisor::Supervisor;
use cadence::{ops, wallet};

const BANNER: &str = r#"
  ____    _    ____  _____ _   _  ____ _____
 / ___|  / \  |  _ \| ____| \ | |/ ___| ____|
| |     / _ \ | | | |  _| |  \| | |   |  _|
| |___ / ___ \| |_| | |___| |\  | |___| |___
 \____/_/   \_\____/|_____|_| \_|\____|_____|

  Continuous AMM Derived-account Execution Engine
  v0.1.0 — Liquidity & Swap Cycler
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    // Print startup banner
    println!("{BANNER}");

    // -- Fatal startup checks --------------------------------------------

    let endpoint = AppConfig::resolve_env(&cfg.chain.rpc_endpoint_env)
        .context("RPC endpoint is required")?;

    let phrases = wallet::read_seed_phrases(&cfg.wallet.seed_file)
        .context("Seed phrases are required")?;

    let operations = ops::build_operations(&cfg.operations)
        .context("Operation configuration is invalid")?;

    info!(
        agent_name = %cfg.agent.name,
        endpoint = %endpoint,
        seeds = phrases.len(),
        operations = operations.len(),
        cycle_interval_secs = cfg.agent.cycle_interval_secs,
        serialize_per_account = cfg.agent.serialize_per_account,
        "CADENCE starting up"
    );

    // -- Connect to the chain --------------------------------------------

    let reinit_delay = Duration::from_secs(cfg.agent.reinit_delay_secs);
    let chain = loop {
        match CosmosRpcClient::connect(&endpoint, &cfg.chain).await {
            Ok(chain) => break chain,
            Err(e) => {
                error!(endpoint = %endpoint, error = %e.summary(), "RPC connect failed — retrying");
                tokio::time::sleep(reinit_delay).await;
            }
        }
    };

    // -- Main loop -------------------------------------------------------

    let mut supervisor = Supervisor::new(&cfg, phrases, operations);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("Entering main loop. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            outcome = supervisor.step(&chain) => {
                if let Some(delay) = outcome.pacing(&cfg.agent) {
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = &mut shutdown => {
                            info!("Shutdown signal received.");
                            break;
                        }
                    }
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    info!("CADENCE shut down cleanly.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cadence=info"));

    let json_logging = std::env::var("CADENCE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
