//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (chain id fits the version field, attempts > 0)
//! - Check numeric strings are plain decimal and fit their wire width
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DeployerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::str::FromStr;

use crate::config::schema::DeployerConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &DeployerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.network.rpc_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "network.rpc_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("network.rpc_url", e.to_string())),
    }

    if config.network.chain_id > u32::from(u16::MAX) {
        errors.push(ValidationError::new(
            "network.chain_id",
            format!("{} does not fit in 16 bits", config.network.chain_id),
        ));
    }

    if config.network.rpc_timeout_secs == Some(0) {
        errors.push(ValidationError::new(
            "network.rpc_timeout_secs",
            "must be greater than 0 when set",
        ));
    }

    if config.wallet.private_key_env.trim().is_empty() {
        errors.push(ValidationError::new("wallet.private_key_env", "must not be empty"));
    }

    if let Some(price) = &config.gas.gas_price {
        if !is_decimal::<u128>(price) {
            errors.push(ValidationError::new(
                "gas.gas_price",
                format!("'{}' is not a decimal integer that fits 128 bits", price),
            ));
        }
    }

    if !is_decimal::<u64>(&config.gas.gas_limit) {
        errors.push(ValidationError::new(
            "gas.gas_limit",
            format!("'{}' is not a decimal integer that fits 64 bits", config.gas.gas_limit),
        ));
    }

    if config.confirmation.max_attempts == 0 {
        errors.push(ValidationError::new(
            "confirmation.max_attempts",
            "must be greater than 0",
        ));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// True for a non-empty run of ASCII digits whose value fits `T`.
pub(crate) fn is_decimal<T: FromStr>(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) && s.parse::<T>().is_ok()
}
