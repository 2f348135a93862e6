//! Chain RPC client with error classification.
//!
//! # Responsibilities
//! - Connect to the node's JSON-RPC endpoint
//! - Query chain state (network id, balance/nonce, minimum gas price)
//! - Submit transactions and look up their receipts
//! - Classify failures as network, RPC-error, or malformed-response

use std::time::Duration;

use alloy::rpc::client::RpcClient;
use alloy::rpc::json_rpc::{RpcRecv, RpcSend};
use alloy::transports::http::{reqwest, Http};
use alloy::transports::{RpcError, TransportError};
use serde_json::Value;

use crate::blockchain::address::AccountAddress;
use crate::blockchain::transaction::TransactionPayload;
use crate::blockchain::types::{BalanceInfo, DeployError, DeployResult, NetworkConfig, TxReceipt};

/// RPC client for a single node endpoint.
#[derive(Clone)]
pub struct ChainClient {
    client: RpcClient,
    config: NetworkConfig,
}

impl ChainClient {
    /// Create a client without contacting the node.
    pub fn connect(config: NetworkConfig) -> DeployResult<Self> {
        let url: url::Url = config.rpc_url.parse().map_err(|e| {
            DeployError::Network(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.rpc_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| DeployError::Network(format!("HTTP client setup failed: {}", e)))?;

        let client = RpcClient::new(Http::with_client(http, url), false);
        Ok(Self { client, config })
    }

    /// Create a client and check the node serves the configured chain.
    ///
    /// A mismatch or failed check is logged; the signed version field makes
    /// the node reject transactions for the wrong chain anyway.
    pub async fn new(config: NetworkConfig) -> DeployResult<Self> {
        let client = Self::connect(config)?;

        match client.verify_chain_id().await {
            Ok(true) => {
                tracing::info!(
                    rpc_url = %client.config.rpc_url,
                    chain_id = client.config.chain_id,
                    "Chain client initialized"
                );
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Chain client initialized but chain verification failed"
                );
            }
        }

        Ok(client)
    }

    /// Compare the node's network id with configuration.
    pub async fn verify_chain_id(&self) -> DeployResult<bool> {
        let actual = self.get_network_id().await?;
        if actual != self.config.chain_id {
            tracing::warn!(
                expected = self.config.chain_id,
                actual = actual,
                "Chain ID mismatch"
            );
            return Ok(false);
        }
        Ok(true)
    }

    async fn call<P, R>(&self, method: &'static str, params: P) -> DeployResult<R>
    where
        P: RpcSend,
        R: RpcRecv,
    {
        tracing::trace!(method = method, "RPC request");
        self.client
            .request(method, params)
            .await
            .map_err(|e| classify(method, e))
    }

    /// `GetNetworkId`.
    pub async fn get_network_id(&self) -> DeployResult<u32> {
        let result: Value = self.call("GetNetworkId", ("",)).await?;
        decimal(&result)
            .and_then(|id| u32::try_from(id).ok())
            .ok_or_else(|| malformed("GetNetworkId", format!("unexpected result {}", result)))
    }

    /// `GetBalance`: balance and current nonce of `address`.
    pub async fn get_balance(&self, address: &AccountAddress) -> DeployResult<BalanceInfo> {
        const METHOD: &str = "GetBalance";
        let result: Value = self.call(METHOD, (address.to_hex(),)).await?;

        let balance = result
            .get("balance")
            .ok_or_else(|| malformed(METHOD, "missing balance"))
            .and_then(|v| decimal(v).ok_or_else(|| malformed(METHOD, format!("bad balance {}", v))))?;
        let nonce = result
            .get("nonce")
            .ok_or_else(|| malformed(METHOD, "missing nonce"))
            .and_then(|v| {
                decimal(v)
                    .and_then(|n| u64::try_from(n).ok())
                    .ok_or_else(|| malformed(METHOD, format!("bad nonce {}", v)))
            })?;

        Ok(BalanceInfo { balance, nonce })
    }

    /// `GetMinimumGasPrice`.
    pub async fn get_minimum_gas_price(&self) -> DeployResult<u128> {
        let result: Value = self.call("GetMinimumGasPrice", ("",)).await?;
        decimal(&result)
            .ok_or_else(|| malformed("GetMinimumGasPrice", format!("unexpected result {}", result)))
    }

    /// `CreateTransaction`. Returns the raw result for the submitter to parse.
    pub async fn create_transaction(&self, payload: &TransactionPayload) -> DeployResult<Value> {
        self.call("CreateTransaction", (payload.clone(),)).await
    }

    /// `GetTransaction`: the receipt, or `None` while the node has none.
    pub async fn get_transaction(&self, tx_hash: &str) -> DeployResult<Option<TxReceipt>> {
        const METHOD: &str = "GetTransaction";
        let result: Value = self.call(METHOD, (tx_hash.to_string(),)).await?;

        match result.get("receipt") {
            None | Some(Value::Null) => Ok(None),
            Some(receipt) => serde_json::from_value(receipt.clone())
                .map(Some)
                .map_err(|e| malformed(METHOD, e.to_string())),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

fn malformed(method: &'static str, reason: impl Into<String>) -> DeployError {
    DeployError::MalformedResponse {
        method,
        reason: reason.into(),
    }
}

/// Numbers arrive either as JSON numbers or as decimal strings.
fn decimal(value: &Value) -> Option<u128> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64().map(u128::from),
        _ => None,
    }
}

fn classify(method: &'static str, err: TransportError) -> DeployError {
    match err {
        RpcError::ErrorResp(payload) => DeployError::Rpc(payload.message.to_string()),
        RpcError::DeserError { err, .. } => malformed(method, err.to_string()),
        RpcError::NullResp => malformed(method, "null result"),
        other => DeployError::Network(other.to_string()),
    }
}
