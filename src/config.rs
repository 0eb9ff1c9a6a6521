//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! The RPC endpoint is referenced by env-var name in the config and
//! resolved at runtime via `std::env::var` (populated from `.env` by
//! dotenv at startup). A missing required key is fatal.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub chain: ChainConfig,
    pub wallet: WalletConfig,
    pub operations: OperationsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    pub name: String,
    /// Delay between completed cycles.
    pub cycle_interval_secs: u64,
    /// Delay before retrying after an init failure or a non-transient fault.
    pub reinit_delay_secs: u64,
    /// Serialize an account's own submissions within a cycle (avoids
    /// on-chain sequence-number contention). Off reproduces the legacy
    /// fire-everything-at-once behavior.
    #[serde(default = "default_serialize_per_account")]
    pub serialize_per_account: bool,
}

fn default_serialize_per_account() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChainConfig {
    /// Name of the env var holding the RPC endpoint URL.
    pub rpc_endpoint_env: String,
    /// Bech32 address prefix, e.g. "zig".
    pub address_prefix: String,
    /// Native gas/fee denomination, e.g. "uzig".
    pub gas_denom: String,
    /// Fee per unit of gas, in `gas_denom`.
    pub gas_price: f64,
    /// Fixed gas limit per contract execution.
    pub gas_limit: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WalletConfig {
    /// Plain-text file, one mnemonic phrase per line.
    pub seed_file: String,
    /// Derivation indices checked per seed phrase (0..n).
    pub accounts_per_seed: u32,
    /// Minimum native-token balance (smallest unit) to admit an account.
    pub min_balance: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OperationsConfig {
    pub provide_liquidity: ProvideLiquidityConfig,
    pub swap_a_to_b: SwapConfig,
    pub swap_b_to_a: SwapConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProvideLiquidityConfig {
    pub enabled: bool,
    pub contract: String,
    pub memo: String,
    pub asset_a_denom: String,
    pub asset_a_amount: String,
    pub asset_b_denom: String,
    pub asset_b_amount: String,
    pub slippage_tolerance: String,
    #[serde(default)]
    pub auto_stake: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SwapConfig {
    pub enabled: bool,
    pub contract: String,
    pub memo: String,
    pub offer_denom: String,
    pub offer_amount: String,
    pub belief_price: String,
    pub max_spread: String,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    /// Used for the RPC endpoint; absence is fatal at startup.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
