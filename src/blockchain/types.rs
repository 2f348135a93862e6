//! Chain-specific types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export NetworkConfig from config module to avoid duplication
pub use crate::config::schema::NetworkConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u16);

impl From<u16> for ChainId {
    fn from(id: u16) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u16 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Pack a chain id and message version into the single version field
/// carried by every transaction.
pub fn pack_version(chain_id: ChainId, msg_version: u16) -> u32 {
    (u32::from(chain_id.0) << 16) | u32::from(msg_version)
}

/// Errors that can occur during the deployment workflow.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Private key is not hex or not a valid secp256k1 scalar.
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    /// Transport-level failure talking to the node.
    #[error("Network error: {0}")]
    Network(String),

    /// A read RPC returned a result that does not match the expected schema.
    #[error("Malformed response from {method}: {reason}")]
    MalformedResponse { method: &'static str, reason: String },

    #[error("Cannot deploy without code or initialisation parameters")]
    MissingCodeOrInit,

    /// Signing failed (key mismatch, malformed transaction fields).
    #[error("Signing error: {0}")]
    Signing(String),

    /// The node answered with a JSON-RPC error object.
    #[error("{0}")]
    Rpc(String),

    /// Submission succeeded but the result lacks an expected field.
    #[error("Unexpected CreateTransaction response: missing {0}")]
    ResponseShape(&'static str),

    /// Polling budget exhausted without a terminal receipt.
    #[error("Transaction {tx_hash} not confirmed after {attempts} attempts")]
    ConfirmationTimeout { tx_hash: String, attempts: u32 },

    /// Transaction was included but the receipt reports failure.
    #[error("Transaction {tx_hash} rejected: {reason}")]
    TransactionRejected { tx_hash: String, reason: String },

    /// No account in the wallet matches the requested address or key.
    #[error("Account {0} not found in wallet")]
    UnknownAccount(String),

    #[error("Gas price {configured} is below the network minimum {minimum}")]
    GasPriceBelowMinimum { configured: u128, minimum: u128 },

    /// Configured gas price is not a decimal that fits 128 bits.
    #[error("Invalid gas price '{0}'")]
    InvalidGasPrice(String),

    /// Confirmation was requested for a transaction that has no hash yet.
    #[error("Transaction has not been submitted")]
    NotSubmitted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeployError {
    /// Stable tag identifying the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DeployError::InvalidKey(_) => "invalid_key",
            DeployError::Network(_) => "network",
            DeployError::MalformedResponse { .. } => "malformed_response",
            DeployError::MissingCodeOrInit => "missing_code_or_init",
            DeployError::Signing(_) => "signing",
            DeployError::Rpc(_) => "rpc",
            DeployError::ResponseShape(_) => "response_shape",
            DeployError::ConfirmationTimeout { .. } => "confirmation_timeout",
            DeployError::TransactionRejected { .. } => "transaction_rejected",
            DeployError::UnknownAccount(_) => "unknown_account",
            DeployError::GasPriceBelowMinimum { .. } => "gas_price_below_minimum",
            DeployError::InvalidGasPrice(_) => "invalid_gas_price",
            DeployError::NotSubmitted => "not_submitted",
            DeployError::Io(_) => "io",
        }
    }
}

/// Result type for deployment operations.
pub type DeployResult<T> = Result<T, DeployError>;

/// Balance and nonce of an account as reported by `GetBalance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceInfo {
    pub balance: u128,
    pub nonce: u64,
}

impl BalanceInfo {
    /// Nonce the next transaction from this account must carry.
    pub fn next_nonce(&self) -> u64 {
        self.nonce + 1
    }
}

/// Receipt attached to a transaction once the network has processed it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TxReceipt {
    pub success: bool,
    #[serde(default)]
    pub epoch_num: Option<String>,
    #[serde(default)]
    pub cumulative_gas: Option<String>,
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
    #[serde(default)]
    pub exceptions: Option<serde_json::Value>,
}

impl TxReceipt {
    /// Human-readable reason for a failed receipt.
    pub fn failure_reason(&self) -> String {
        let mut parts = Vec::new();
        if let Some(errors) = self.errors.as_ref().filter(|v| !is_empty_json(v)) {
            parts.push(format!("errors={}", errors));
        }
        if let Some(exceptions) = self.exceptions.as_ref().filter(|v| !is_empty_json(v)) {
            parts.push(format!("exceptions={}", exceptions));
        }
        if parts.is_empty() {
            "receipt reports success=false".to_string()
        } else {
            parts.join(" ")
        }
    }
}

fn is_empty_json(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Array(a) => a.is_empty(),
        serde_json::Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// Outcome recorded by a receipt. A missing receipt is not an outcome; the
/// poller keeps waiting or times out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    Confirmed { epoch: Option<u64> },
    Failed(String),
}

impl From<&TxReceipt> for ConfirmationStatus {
    fn from(receipt: &TxReceipt) -> Self {
        if receipt.success {
            ConfirmationStatus::Confirmed {
                epoch: receipt.epoch_num.as_deref().and_then(|e| e.parse().ok()),
            }
        } else {
            ConfirmationStatus::Failed(receipt.failure_reason())
        }
    }
}
