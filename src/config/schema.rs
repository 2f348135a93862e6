//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a deployment.
//! All types derive Serde traits for deserialization from config files.
//! Secrets never appear here: the wallet section only names the environment
//! variable that holds the private key.

use serde::{Deserialize, Serialize};

use crate::blockchain::contract::InitParam;

/// Root configuration for a deployment run.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DeployerConfig {
    /// Node endpoint and chain identity.
    pub network: NetworkConfig,

    /// Where the signing key comes from.
    pub wallet: WalletConfig,

    /// Gas bounds for the deployment transaction.
    pub gas: GasConfig,

    /// Contract source and constructor parameters.
    pub contract: ContractConfig,

    /// Confirmation polling settings.
    pub confirmation: ConfirmationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Network configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Chain ID (333 for the developer testnet, 1 for mainnet).
    pub chain_id: u32,

    /// Message format version packed with the chain id.
    pub msg_version: u16,

    /// Per-call RPC timeout in seconds. Unset means calls wait indefinitely.
    pub rpc_timeout_secs: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://dev-api.zilliqa.com/".to_string(),
            chain_id: 333,
            msg_version: 1,
            rpc_timeout_secs: None,
        }
    }
}

/// Wallet configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Environment variable holding the hex private key.
    pub private_key_env: String,

    /// Address to mark as the default account after import.
    pub default_account: Option<String>,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            private_key_env: "DEPLOYER_PRIVATE_KEY".to_string(),
            default_account: None,
        }
    }
}

/// Gas configuration. Values are decimal strings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GasConfig {
    /// Gas price floor. Unset means the node's minimum gas price.
    pub gas_price: Option<String>,

    /// Gas limit ceiling.
    pub gas_limit: String,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            gas_price: None,
            gas_limit: "50000".to_string(),
        }
    }
}

/// Contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Path to the contract source, relative to the working directory.
    pub code_path: String,

    /// Ordered constructor parameters.
    pub init: Vec<InitParam>,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            code_path: "contracts/FungibleToken.scilla".to_string(),
            init: Vec::new(),
        }
    }
}

/// Confirmation polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Maximum number of status queries.
    pub max_attempts: u32,

    /// Delay between status queries in milliseconds.
    pub interval_ms: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1000,
            interval_ms: 10_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
