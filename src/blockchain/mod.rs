//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variable (private key)
//!     → wallet.rs (key import, address derivation, signing)
//!     → contract.rs (contract spec → unsigned deployment transaction)
//!     → client.rs (RPC reads, submission, receipt lookup)
//!     → transaction.rs (sign payload, submit, confirm)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - Per-call RPC timeouts are opt-in; polling has an attempt ceiling

pub mod address;
pub mod client;
pub mod contract;
pub mod schnorr;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use address::AccountAddress;
pub use client::ChainClient;
pub use contract::{build_deployment, ContractSpec, DeploymentParameters, InitParam};
pub use transaction::{Transaction, TxState};
pub use types::{ChainId, ConfirmationStatus, DeployError, DeployResult};
pub use wallet::Wallet;
