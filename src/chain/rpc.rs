//! Cosmos RPC chain client.
//!
//! Production `ChainClient` over a Tendermint HTTP RPC endpoint. The
//! chain id is discovered from node status at connect time. Balances and
//! account number/sequence come from ABCI queries against the bank and
//! auth modules; contract executions are signed locally with a fixed gas
//! limit and broadcast sync.

use async_trait::async_trait;
use chrono::Utc;
use cosmrs::cosmwasm::MsgExecuteContract;
use cosmrs::proto::cosmos::auth::v1beta1::{
    BaseAccount, QueryAccountRequest, QueryAccountResponse,
};
use cosmrs::proto::cosmos::bank::v1beta1::{QueryBalanceRequest, QueryBalanceResponse};
use cosmrs::proto::traits::Message;
use cosmrs::rpc::{Client, HttpClient};
use cosmrs::tendermint::chain::Id as ChainId;
use cosmrs::tx::{self, Fee, Msg, SignDoc, SignerInfo};
use cosmrs::{AccountId, Coin};
use tracing::{debug, info};

use super::{ChainClient, ChainError};
use crate::config::ChainConfig;
use crate::types::{first_line, OperationSpec, TxReceipt};
use crate::wallet::AccountIdentity;

const BALANCE_QUERY_PATH: &str = "/cosmos.bank.v1beta1.Query/Balance";
const ACCOUNT_QUERY_PATH: &str = "/cosmos.auth.v1beta1.Query/Account";

pub struct CosmosRpcClient {
    rpc: HttpClient,
    endpoint: String,
    chain_id: ChainId,
    gas_denom: String,
    gas_price: f64,
    gas_limit: u64,
}

impl CosmosRpcClient {
    /// Connect to the RPC endpoint and discover the chain id from node
    /// status.
    pub async fn connect(endpoint: &str, cfg: &ChainConfig) -> Result<Self, ChainError> {
        let rpc = HttpClient::new(endpoint).map_err(classify_rpc_error)?;
        let status = rpc.status().await.map_err(classify_rpc_error)?;
        let chain_id = status.node_info.network.clone();

        info!(endpoint, chain_id = %chain_id, "Connected to RPC node");

        Ok(Self {
            rpc,
            endpoint: endpoint.to_string(),
            chain_id,
            gas_denom: cfg.gas_denom.clone(),
            gas_price: cfg.gas_price,
            gas_limit: cfg.gas_limit,
        })
    }

    async fn abci_query(&self, path: &str, data: Vec<u8>) -> Result<Vec<u8>, ChainError> {
        let result = self
            .rpc
            .abci_query(Some(path.to_string()), data, None, false)
            .await
            .map_err(classify_rpc_error)?;

        if result.code.is_err() {
            return Err(ChainError::Query(format!(
                "{path}: {}",
                first_line(&result.log)
            )));
        }
        Ok(result.value)
    }

    /// Account number and current sequence, fetched fresh per submission.
    async fn account_info(&self, address: &str) -> Result<(u64, u64), ChainError> {
        let request = QueryAccountRequest {
            address: address.to_string(),
        };
        let value = self
            .abci_query(ACCOUNT_QUERY_PATH, request.encode_to_vec())
            .await?;

        let response = QueryAccountResponse::decode(value.as_slice())
            .map_err(|e| ChainError::Query(format!("account response decode: {e}")))?;
        let any = response.account.ok_or_else(|| {
            ChainError::Query(format!("account not found on chain: {address}"))
        })?;
        let account = BaseAccount::decode(any.value.as_slice())
            .map_err(|e| ChainError::Query(format!("account decode: {e}")))?;

        Ok((account.account_number, account.sequence))
    }

    fn fee(&self) -> Result<Fee, ChainError> {
        let coin = Coin {
            denom: self
                .gas_denom
                .parse()
                .map_err(|e| ChainError::Malformed(format!("gas denom: {e}")))?,
            amount: fee_amount(self.gas_limit, self.gas_price),
        };
        Ok(Fee::from_amount_and_gas(coin, self.gas_limit))
    }
}

#[async_trait]
impl ChainClient for CosmosRpcClient {
    async fn native_balance(&self, address: &str, denom: &str) -> Result<u128, ChainError> {
        let request = QueryBalanceRequest {
            address: address.to_string(),
            denom: denom.to_string(),
        };
        let value = self
            .abci_query(BALANCE_QUERY_PATH, request.encode_to_vec())
            .await?;

        let response = QueryBalanceResponse::decode(value.as_slice())
            .map_err(|e| ChainError::Query(format!("balance decode: {e}")))?;

        // An account the chain has never seen simply has no balance entry.
        let amount = response
            .balance
            .map(|coin| coin.amount)
            .unwrap_or_else(|| "0".to_string());
        amount
            .parse::<u128>()
            .map_err(|e| ChainError::Query(format!("balance parse '{amount}': {e}")))
    }

    async fn execute_contract(
        &self,
        account: &AccountIdentity,
        op: &OperationSpec,
    ) -> Result<TxReceipt, ChainError> {
        let sender: AccountId = account
            .address
            .parse()
            .map_err(|e| ChainError::Malformed(format!("sender address: {e}")))?;
        let contract: AccountId = op
            .contract
            .parse()
            .map_err(|e| ChainError::Malformed(format!("contract address: {e}")))?;

        let mut funds = Vec::with_capacity(op.funds.len());
        for coin in &op.funds {
            funds.push(Coin {
                denom: coin.denom.parse().map_err(|e| {
                    ChainError::Malformed(format!("fund denom '{}': {e}", coin.denom))
                })?,
                amount: coin.amount.parse().map_err(|e| {
                    ChainError::Malformed(format!("fund amount '{}': {e}", coin.amount))
                })?,
            });
        }

        let msg = MsgExecuteContract {
            sender,
            contract,
            msg: serde_json::to_vec(&op.msg)
                .map_err(|e| ChainError::Malformed(format!("payload encode: {e}")))?,
            funds,
        };

        let (account_number, sequence) = self.account_info(&account.address).await?;

        let body = tx::Body::new(
            vec![msg
                .to_any()
                .map_err(|e| ChainError::Malformed(format!("message encode: {e}")))?],
            op.memo.as_str(),
            0u32,
        );
        let signer = SignerInfo::single_direct(Some(account.signing_key().public_key()), sequence);
        let auth_info = signer.auth_info(self.fee()?);
        let sign_doc = SignDoc::new(&body, &auth_info, &self.chain_id, account_number)
            .map_err(|e| ChainError::Malformed(format!("sign doc: {e}")))?;
        let tx_raw = sign_doc
            .sign(account.signing_key())
            .map_err(|e| ChainError::Malformed(format!("signing: {e}")))?;

        debug!(
            sender = %account.address,
            contract = %op.contract,
            memo = %op.memo,
            sequence,
            "Broadcasting contract execution"
        );

        let tx_bytes = tx_raw
            .to_bytes()
            .map_err(|e| ChainError::Malformed(format!("tx encode: {e}")))?;
        let response = self
            .rpc
            .broadcast_tx_sync(tx_bytes)
            .await
            .map_err(classify_rpc_error)?;

        if response.code.is_err() {
            return Err(ChainError::Rejected {
                code: response.code.value(),
                log: first_line(&response.log),
            });
        }

        Ok(TxReceipt {
            hash: response.hash.to_string(),
            timestamp: Utc::now(),
        })
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Fixed fee: gas limit × gas price, rounded up to a whole smallest unit.
fn fee_amount(gas_limit: u64, gas_price: f64) -> u128 {
    (gas_limit as f64 * gas_price).ceil() as u128
}

/// Map a transport-layer error to the typed taxonomy. This is the single
/// place where connectivity errors are inspected; everything downstream
/// branches on `ChainError::is_transient`.
fn classify_rpc_error(err: cosmrs::rpc::Error) -> ChainError {
    let text = err.to_string();
    let lowered = text.to_ascii_lowercase();
    if lowered.contains("timed out") || lowered.contains("timeout") {
        ChainError::Timeout(first_line(&text))
    } else {
        ChainError::Transport(first_line(&text))
    }
}
