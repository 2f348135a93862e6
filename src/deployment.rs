//! Deployment orchestration.
//!
//! # Stages
//! ```text
//! validate contract → query chain state → build → sign → submit → confirm
//! ```
//!
//! Each stage's output is the next stage's precondition, so the first error
//! ends the run. Success requires an observed, successful receipt.

use std::path::Path;
use std::time::Duration;

use tracing::Instrument;

use crate::blockchain::address::AccountAddress;
use crate::blockchain::client::ChainClient;
use crate::blockchain::contract::{build_deployment, ContractSpec, DeploymentParameters};
use crate::blockchain::transaction::Transaction;
use crate::blockchain::types::{pack_version, ChainId, ConfirmationStatus, DeployError, DeployResult};
use crate::blockchain::wallet::{Account, Wallet};
use crate::config::schema::{DeployerConfig, WalletConfig};
use crate::config::validation::is_decimal;
use crate::observability::tracing::{deploy_span, record_tx_hash};

/// Result of a confirmed deployment.
#[derive(Debug, Clone)]
pub struct DeploymentReport {
    pub tx_hash: String,
    pub contract_address: String,
    pub sender: AccountAddress,
    pub epoch: Option<u64>,
    pub transaction: Transaction,
}

/// Import the key named by the wallet config and apply the default account.
pub fn load_wallet(config: &WalletConfig) -> DeployResult<Wallet> {
    let mut wallet = Wallet::from_env(&config.private_key_env)?;
    if let Some(default) = &config.default_account {
        wallet.set_default(default)?;
    }
    Ok(wallet)
}

/// Runs deployments against one node with one wallet.
#[derive(Debug)]
pub struct Deployer {
    config: DeployerConfig,
    client: ChainClient,
    wallet: Wallet,
}

impl Deployer {
    pub fn new(config: DeployerConfig, client: ChainClient, wallet: Wallet) -> Self {
        Self {
            config,
            client,
            wallet,
        }
    }

    /// Load the wallet from the environment and connect to the node.
    pub async fn from_config(config: DeployerConfig) -> DeployResult<Self> {
        let wallet = load_wallet(&config.wallet)?;
        let client = ChainClient::new(config.network.clone()).await?;
        Ok(Self::new(config, client, wallet))
    }

    pub fn client(&self) -> &ChainClient {
        &self.client
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    fn sender(&self) -> DeployResult<&Account> {
        self.wallet
            .default_account()
            .ok_or_else(|| DeployError::UnknownAccount("default".to_string()))
    }

    /// Read the configured contract source with its init parameters.
    pub async fn load_contract(&self, code_path: Option<&Path>) -> DeployResult<ContractSpec> {
        let path = code_path.unwrap_or_else(|| Path::new(&self.config.contract.code_path));
        ContractSpec::from_file(path, self.config.contract.init.clone()).await
    }

    /// Deploy `spec` and wait for its receipt.
    pub async fn deploy(&self, spec: &ContractSpec) -> DeployResult<DeploymentReport> {
        let span = deploy_span();
        self.run(spec, &span).instrument(span.clone()).await
    }

    async fn run(&self, spec: &ContractSpec, span: &tracing::Span) -> DeployResult<DeploymentReport> {
        spec.validate()?;

        let sender = self.sender()?;
        let address = sender.address();
        tracing::info!(
            address = %address,
            bech32 = %address.to_bech32(),
            "Deploying from account"
        );

        let balance = self.client.get_balance(&address).await?;
        let minimum_gas_price = self.client.get_minimum_gas_price().await?;
        tracing::info!(
            balance = %balance.balance,
            nonce = balance.nonce,
            minimum_gas_price = %minimum_gas_price,
            "Chain state loaded"
        );

        let params = DeploymentParameters {
            version: self.version()?.to_string(),
            nonce: balance.next_nonce().to_string(),
            gas_price: self.gas_price(minimum_gas_price)?,
            gas_limit: self.config.gas.gas_limit.clone(),
            sender_pub_key: sender.public_key_hex().to_string(),
        };

        let mut tx = build_deployment(spec, &params)?;
        self.wallet
            .sign_with(&mut tx, &address.to_hex(), &self.client)
            .await?;

        tx.submit(&self.client).await?;
        let tx_hash = tx.id.clone().ok_or(DeployError::ResponseShape("TranID"))?;
        let contract_address = tx
            .contract_address
            .clone()
            .ok_or(DeployError::ResponseShape("ContractAddress"))?;
        record_tx_hash(span, &tx_hash);
        tracing::info!(
            contract_address = %contract_address,
            "Deployment submitted, awaiting confirmation"
        );

        let confirmation = &self.config.confirmation;
        let status = tx
            .confirm(
                &self.client,
                confirmation.max_attempts,
                Duration::from_millis(confirmation.interval_ms),
            )
            .await?;

        match status {
            ConfirmationStatus::Confirmed { epoch } => {
                tracing::info!(
                    contract_address = %contract_address,
                    epoch = ?epoch,
                    "Deployment confirmed"
                );
                Ok(DeploymentReport {
                    tx_hash,
                    contract_address,
                    sender: address,
                    epoch,
                    transaction: tx,
                })
            }
            ConfirmationStatus::Failed(reason) => {
                tracing::error!(reason = %reason, "Deployment rejected");
                Err(DeployError::TransactionRejected { tx_hash, reason })
            }
        }
    }

    fn version(&self) -> DeployResult<u32> {
        let chain_id = u16::try_from(self.config.network.chain_id).map_err(|_| {
            DeployError::Signing(format!(
                "chain id {} does not fit the version field",
                self.config.network.chain_id
            ))
        })?;
        Ok(pack_version(ChainId(chain_id), self.config.network.msg_version))
    }

    /// Configured gas price or the node minimum; below-minimum is an error.
    fn gas_price(&self, minimum: u128) -> DeployResult<String> {
        match &self.config.gas.gas_price {
            Some(configured) => {
                if !is_decimal::<u128>(configured) {
                    return Err(DeployError::InvalidGasPrice(configured.clone()));
                }
                let value: u128 = configured
                    .parse()
                    .map_err(|_| DeployError::InvalidGasPrice(configured.clone()))?;
                if value < minimum {
                    return Err(DeployError::GasPriceBelowMinimum {
                        configured: value,
                        minimum,
                    });
                }
                Ok(configured.clone())
            }
            None => Ok(minimum.to_string()),
        }
    }
}
