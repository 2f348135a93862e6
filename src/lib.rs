//! Scilla contract deployer library.

pub mod blockchain;
pub mod config;
pub mod deployment;
pub mod observability;

pub use config::schema::DeployerConfig;
pub use deployment::{Deployer, DeploymentReport};
