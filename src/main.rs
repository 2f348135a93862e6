//! Scilla contract deployer.
//!
//! # Architecture Overview
//!
//! ```text
//!   deploy.toml ──▶ config ──▶ ┌──────────────────────────────────────────┐
//!   $DEPLOYER_PRIVATE_KEY ───▶ │ wallet ─▶ chain state ─▶ build ─▶ sign   │
//!   FungibleToken.scilla ────▶ │                 ─▶ submit ─▶ confirm     │──▶ node RPC
//!                              └──────────────────────────────────────────┘
//! ```
//!
//! Every stage waits for the previous one; the first failure ends the run
//! with a non-zero exit status and a log line tagged with the failure kind.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use scilla_deployer::blockchain::address::address_from_private_key;
use scilla_deployer::blockchain::{ChainClient, DeployError};
use scilla_deployer::config::{load_config_with, DeployerConfig};
use scilla_deployer::deployment::{load_wallet, Deployer};
use scilla_deployer::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "scilla-deployer")]
#[command(about = "Deploy a Scilla contract and wait for confirmation", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "deploy.toml")]
    config: PathBuf,

    /// Override the RPC endpoint from the configuration.
    #[arg(long)]
    rpc_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy the configured contract
    Deploy {
        /// Override the contract source path
        #[arg(long)]
        code: Option<PathBuf>,
    },
    /// Show the addresses derived from the configured private key
    Address,
    /// Show balance, nonce and minimum gas price for the default account
    Balance,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let rpc_url = cli.rpc_url;
    let config = match load_config_with(&cli.config, |config| {
        if let Some(url) = rpc_url {
            config.network.rpc_url = url;
        }
    }) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.observability);
    tracing::info!("scilla-deployer v{} starting", env!("CARGO_PKG_VERSION"));

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(kind = e.kind(), error = %e, "Run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: DeployerConfig) -> Result<(), DeployError> {
    match command {
        Commands::Deploy { code } => {
            let deployer = Deployer::from_config(config).await?;
            let spec = deployer.load_contract(code.as_deref()).await?;
            let report = deployer.deploy(&spec).await?;
            println!("Contract address: {}", report.contract_address);
            println!("Transaction hash: {}", report.tx_hash);
        }
        Commands::Address => {
            let wallet = load_wallet(&config.wallet)?;
            let account = wallet
                .default_account()
                .ok_or_else(|| DeployError::UnknownAccount("default".to_string()))?;
            let key = std::env::var(&config.wallet.private_key_env).map_err(|_| {
                DeployError::InvalidKey(format!(
                    "Environment variable {} not set",
                    config.wallet.private_key_env
                ))
            })?;
            let direct = address_from_private_key(&key)?;

            println!("Wallet address:     {}", account.address());
            println!("From private key:   {}", direct);
            println!("Checksum address:   {}", account.address().to_checksum());
            println!("Bech32 address:     {}", account.address().to_bech32());
            println!("Public key:         {}", account.public_key_hex());
            if direct != account.address() {
                tracing::warn!("Default account differs from the imported key's address");
            }
        }
        Commands::Balance => {
            let wallet = load_wallet(&config.wallet)?;
            let account = wallet
                .default_account()
                .ok_or_else(|| DeployError::UnknownAccount("default".to_string()))?;
            let client = ChainClient::new(config.network).await?;
            let info = client.get_balance(&account.address()).await?;
            let gas = client.get_minimum_gas_price().await?;

            println!("Account:            {}", account.address());
            println!("Balance:            {}", info.balance);
            println!("Nonce:              {}", info.nonce);
            println!("Minimum gas price:  {}", gas);
        }
    }
    Ok(())
}
