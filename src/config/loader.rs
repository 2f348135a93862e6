//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::DeployerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<DeployerConfig, ConfigError> {
    parse_config_with(content, |_| {})
}

/// Parse TOML text, apply `overrides`, then validate the result.
pub fn parse_config_with<F>(content: &str, overrides: F) -> Result<DeployerConfig, ConfigError>
where
    F: FnOnce(&mut DeployerConfig),
{
    let mut config: DeployerConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    overrides(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<DeployerConfig, ConfigError> {
    load_config_with(path, |_| {})
}

/// Load a TOML file, apply command-line `overrides`, then validate.
pub fn load_config_with<F>(path: &Path, overrides: F) -> Result<DeployerConfig, ConfigError>
where
    F: FnOnce(&mut DeployerConfig),
{
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config_with(&content, overrides)
}
