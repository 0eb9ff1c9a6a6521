//! Account Deriver admission behavior.

use cadence::wallet::{self, DeriveParams};

use crate::mock_chain::{address_at, MockChain, GAS_DENOM, PREFIX, TEST_MNEMONIC, TEST_MNEMONIC_2};

fn params<'a>(phrases: &'a [String], per_seed: u32, min_balance: u128) -> DeriveParams<'a> {
    DeriveParams {
        phrases,
        accounts_per_seed: per_seed,
        min_balance,
        prefix: PREFIX,
        balance_denom: GAS_DENOM,
    }
}

#[tokio::test]
async fn test_admission_filter_preserves_derivation_order() {
    // Six indices with balances straddling the threshold; exactly those
    // at or above 100000 are admitted, in derivation order.
    let balances: [u128; 6] = [50_000, 150_000, 0, 999_999, 100_000, 99_999];

    let chain = MockChain::new();
    for (i, balance) in balances.iter().enumerate() {
        chain.set_balance(&address_at(i as u32), *balance);
    }

    let phrases = vec![TEST_MNEMONIC.to_string()];
    let active = wallet::init_accounts(&chain, &params(&phrases, 6, 100_000))
        .await
        .unwrap();

    let indices: Vec<u32> = active.iter().map(|a| a.identity.index).collect();
    assert_eq!(indices, vec![1, 3, 4]);
    assert_eq!(active.len(), 3);
    // Admission records the observed balance as a snapshot
    assert_eq!(active[0].balance, 150_000);
    assert_eq!(active[1].balance, 999_999);
    assert_eq!(active[2].balance, 100_000);
}

#[tokio::test]
async fn test_balance_query_failure_excludes_only_that_index() {
    let chain = MockChain::new();
    for i in 0..4u32 {
        chain.set_balance(&address_at(i), 500_000);
    }
    chain.fail_balance_for(&address_at(2));

    let phrases = vec![TEST_MNEMONIC.to_string()];
    let active = wallet::init_accounts(&chain, &params(&phrases, 4, 100_000))
        .await
        .unwrap();

    let indices: Vec<u32> = active.iter().map(|a| a.identity.index).collect();
    assert_eq!(indices, vec![0, 1, 3]);
}

#[tokio::test]
async fn test_multiple_seeds_accumulate_into_one_flat_list() {
    let chain = MockChain::new();

    let phrases = vec![TEST_MNEMONIC.to_string(), TEST_MNEMONIC_2.to_string()];
    let mut expected = Vec::new();
    for phrase in &phrases {
        for i in 0..2u32 {
            let identity = cadence::wallet::AccountIdentity::derive(phrase, i, PREFIX).unwrap();
            chain.set_balance(&identity.address, 200_000);
            expected.push(identity.address.clone());
        }
    }

    let active = wallet::init_accounts(&chain, &params(&phrases, 2, 100_000))
        .await
        .unwrap();

    let addresses: Vec<String> = active.iter().map(|a| a.identity.address.clone()).collect();
    assert_eq!(addresses, expected);
}

#[tokio::test]
async fn test_empty_active_set_is_ok_not_err() {
    // Nothing meets the threshold; the deriver reports an empty set and
    // leaves the fatality decision to the run loop.
    let chain = MockChain::new();
    let phrases = vec![TEST_MNEMONIC.to_string()];
    let active = wallet::init_accounts(&chain, &params(&phrases, 3, 100_000))
        .await
        .unwrap();
    assert!(active.is_empty());
}
