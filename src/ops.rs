//! Transaction builder.
//!
//! Turns static configuration into validated `OperationSpec`s — one per
//! enabled operation type. Pure: no network access, no randomness, no
//! runtime inputs. The payloads follow the CosmWasm pair-contract schema
//! (externally-tagged, snake_case JSON); all amounts and price bounds are
//! passed through as strings, unmodified.

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::config::{OperationsConfig, ProvideLiquidityConfig, SwapConfig};
use crate::types::{CoinSpec, OperationSpec};

// ---------------------------------------------------------------------------
// Pair-contract execute messages
// ---------------------------------------------------------------------------

/// Execute messages accepted by the AMM pair contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairExecuteMsg {
    ProvideLiquidity {
        assets: Vec<Asset>,
        slippage_tolerance: String,
        auto_stake: bool,
    },
    Swap {
        offer_asset: Asset,
        belief_price: String,
        max_spread: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct Asset {
    pub info: AssetInfo,
    /// Amount in the smallest unit, as a decimal string.
    pub amount: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetInfo {
    NativeToken { denom: String },
}

fn native(denom: &str, amount: &str) -> Asset {
    Asset {
        info: AssetInfo::NativeToken {
            denom: denom.to_string(),
        },
        amount: amount.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Spec builders
// ---------------------------------------------------------------------------

/// Build the specs for all enabled operations, in config order:
/// provide-liquidity, swap A→B, swap B→A.
///
/// An invalid or empty set is a configuration error — fatal at startup,
/// never retried per cycle.
pub fn build_operations(cfg: &OperationsConfig) -> Result<Vec<OperationSpec>> {
    let mut specs = Vec::new();

    if cfg.provide_liquidity.enabled {
        specs.push(provide_liquidity_spec(&cfg.provide_liquidity)?);
    }
    if cfg.swap_a_to_b.enabled {
        specs.push(swap_spec(&cfg.swap_a_to_b)?);
    }
    if cfg.swap_b_to_a.enabled {
        specs.push(swap_spec(&cfg.swap_b_to_a)?);
    }

    if specs.is_empty() {
        bail!("No operations enabled — nothing to do");
    }
    Ok(specs)
}

/// Provide-liquidity spec: both assets attached as funds.
pub fn provide_liquidity_spec(cfg: &ProvideLiquidityConfig) -> Result<OperationSpec> {
    let msg = PairExecuteMsg::ProvideLiquidity {
        assets: vec![
            native(&cfg.asset_a_denom, &cfg.asset_a_amount),
            native(&cfg.asset_b_denom, &cfg.asset_b_amount),
        ],
        slippage_tolerance: cfg.slippage_tolerance.clone(),
        auto_stake: cfg.auto_stake,
    };

    let spec = OperationSpec {
        memo: cfg.memo.clone(),
        contract: cfg.contract.clone(),
        msg: serde_json::to_value(&msg)
            .with_context(|| format!("Failed to encode payload for '{}'", cfg.memo))?,
        funds: vec![
            CoinSpec {
                denom: cfg.asset_a_denom.clone(),
                amount: cfg.asset_a_amount.clone(),
            },
            CoinSpec {
                denom: cfg.asset_b_denom.clone(),
                amount: cfg.asset_b_amount.clone(),
            },
        ],
    };

    validate_spec(&spec)?;
    Ok(spec)
}

/// Swap spec: the offer asset is attached as funds.
pub fn swap_spec(cfg: &SwapConfig) -> Result<OperationSpec> {
    let msg = PairExecuteMsg::Swap {
        offer_asset: native(&cfg.offer_denom, &cfg.offer_amount),
        belief_price: cfg.belief_price.clone(),
        max_spread: cfg.max_spread.clone(),
    };

    let spec = OperationSpec {
        memo: cfg.memo.clone(),
        contract: cfg.contract.clone(),
        msg: serde_json::to_value(&msg)
            .with_context(|| format!("Failed to encode payload for '{}'", cfg.memo))?,
        funds: vec![CoinSpec {
            denom: cfg.offer_denom.clone(),
            amount: cfg.offer_amount.clone(),
        }],
    };

    validate_spec(&spec)?;
    Ok(spec)
}

/// A spec missing its contract, payload, or funds is unusable.
fn validate_spec(spec: &OperationSpec) -> Result<()> {
    if spec.contract.trim().is_empty() {
        bail!("Operation '{}': contract address is empty", spec.memo);
    }
    if spec.msg.is_null() {
        bail!("Operation '{}': payload is empty", spec.memo);
    }
    if spec.funds.is_empty() {
        bail!("Operation '{}': no funds attached", spec.memo);
    }
    for coin in &spec.funds {
        if coin.denom.trim().is_empty() || coin.amount.trim().is_empty() {
            bail!("Operation '{}': incomplete funds entry", spec.memo);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
