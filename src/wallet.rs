//! Account derivation and admission.
//!
//! Derives wallet accounts from seed phrases along the standard Cosmos
//! HD path (`m/44'/118'/0'/0/{index}`), checks each account's native
//! balance through the chain client, and admits only those meeting the
//! configured minimum. The admitted set is a point-in-time snapshot —
//! balances are used for admission only, never re-checked for spending.

use anyhow::{anyhow, Context, Result};
use cosmrs::bip32::DerivationPath;
use cosmrs::crypto::secp256k1::SigningKey;
use std::fs;
use std::time::Duration;
use tracing::{info, warn};

use crate::chain::ChainClient;
use crate::types::short_address;

/// Pacing delay between per-index initializations, to stay under public
/// RPC rate limits.
const INIT_PACING_MS: u64 = 250;

/// Standard Cosmos path, coin type 118.
fn hd_path(index: u32) -> String {
    format!("m/44'/118'/0'/0/{index}")
}

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

/// One derived account: address plus exclusive ownership of its signing key.
///
/// Immutable for the process lifetime; discarded wholesale (with the rest
/// of the active set) on re-initialization.
pub struct AccountIdentity {
    /// Derivation index within its seed phrase.
    pub index: u32,
    /// Bech32 account address.
    pub address: String,
    key: SigningKey,
}

impl AccountIdentity {
    /// Derive the identity at `index` from a BIP-39 mnemonic phrase.
    pub fn derive(phrase: &str, index: u32, prefix: &str) -> Result<Self> {
        let mnemonic = bip39::Mnemonic::parse(phrase.trim())
            .map_err(|e| anyhow!("invalid mnemonic: {e}"))?;
        let seed = mnemonic.to_seed("");

        let path: DerivationPath = hd_path(index)
            .parse()
            .map_err(|e| anyhow!("invalid derivation path: {e}"))?;
        let key = SigningKey::derive_from_path(seed, &path)
            .map_err(|e| anyhow!("key derivation failed at index {index}: {e}"))?;

        let address = key
            .public_key()
            .account_id(prefix)
            .map_err(|e| anyhow!("address encoding failed: {e}"))?
            .to_string();

        Ok(Self { index, address, key })
    }

    /// The signing key. Never leaves the chain-client boundary.
    pub fn signing_key(&self) -> &SigningKey {
        &self.key
    }
}

impl std::fmt::Debug for AccountIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of logs
        f.debug_struct("AccountIdentity")
            .field("index", &self.index)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// An admitted account: identity plus the balance observed at admission.
#[derive(Debug)]
pub struct ActiveAccount {
    pub identity: AccountIdentity,
    /// Native-token balance at admission time, smallest unit.
    pub balance: u128,
}

impl ActiveAccount {
    pub fn short_address(&self) -> String {
        short_address(&self.identity.address)
    }
}

// ---------------------------------------------------------------------------
// Seed file
// ---------------------------------------------------------------------------

/// Read mnemonic phrases from a plain-text file, one per line.
/// Blank lines are skipped; an unreadable or empty file is fatal.
pub fn read_seed_phrases(path: &str) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file: {path}"))?;

    let phrases: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    if phrases.is_empty() {
        anyhow::bail!("Seed file is empty: {path}");
    }
    Ok(phrases)
}

// ---------------------------------------------------------------------------
// Admission
// ---------------------------------------------------------------------------

/// Parameters for one initialization pass.
pub struct DeriveParams<'a> {
    pub phrases: &'a [String],
    pub accounts_per_seed: u32,
    pub min_balance: u128,
    /// Bech32 address prefix.
    pub prefix: &'a str,
    /// Denomination whose balance gates admission.
    pub balance_denom: &'a str,
}

/// Derive every (phrase, index) identity, query its balance, and collect
/// the accounts meeting the minimum into one flat list in derivation order.
///
/// A derivation or balance-query failure excludes that index only; the
/// batch continues. Returns `Ok` even when the active set comes back
/// empty — the caller decides what an empty set means for the run.
pub async fn init_accounts(
    chain: &dyn ChainClient,
    params: &DeriveParams<'_>,
) -> Result<Vec<ActiveAccount>> {
    info!(
        seeds = params.phrases.len(),
        per_seed = params.accounts_per_seed,
        min_balance = params.min_balance,
        "Initializing accounts"
    );

    let mut active = Vec::new();

    for (seed_no, phrase) in params.phrases.iter().enumerate() {
        for index in 0..params.accounts_per_seed {
            let identity = match AccountIdentity::derive(phrase, index, params.prefix) {
                Ok(identity) => identity,
                Err(e) => {
                    warn!(
                        seed = seed_no,
                        index,
                        error = %e,
                        "Wallet derivation failed — index excluded"
                    );
                    continue;
                }
            };

            let balance = match chain
                .native_balance(&identity.address, params.balance_denom)
                .await
            {
                Ok(balance) => balance,
                Err(e) => {
                    warn!(
                        seed = seed_no,
                        index,
                        address = %short_address(&identity.address),
                        error = %e.summary(),
                        "Balance query failed — index excluded"
                    );
                    continue;
                }
            };

            if balance >= params.min_balance {
                info!(
                    seed = seed_no,
                    index,
                    address = %short_address(&identity.address),
                    balance,
                    "Account admitted"
                );
                active.push(ActiveAccount { identity, balance });
            } else {
                info!(
                    seed = seed_no,
                    index,
                    address = %short_address(&identity.address),
                    balance,
                    min = params.min_balance,
                    "Balance below threshold — account skipped"
                );
            }

            tokio::time::sleep(Duration::from_millis(INIT_PACING_MS)).await;
        }
    }

    info!(active = active.len(), "Account initialization complete");
    Ok(active)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
