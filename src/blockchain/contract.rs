//! Contract sources, deployment parameters, and the deployment builder.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::blockchain::address::AccountAddress;
use crate::blockchain::transaction::Transaction;
use crate::blockchain::types::{DeployError, DeployResult};

/// Artifact left in sources that went through an extra escaping pass.
const ESCAPED_BACKSLASH: &str = "/\\";

/// One typed constructor parameter, serialized as `{vname, type, value}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitParam {
    #[serde(rename = "vname")]
    pub name: String,

    #[serde(rename = "type")]
    pub type_tag: String,

    pub value: serde_json::Value,
}

impl InitParam {
    pub fn new(
        name: impl Into<String>,
        type_tag: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            name: name.into(),
            type_tag: type_tag.into(),
            value: value.into(),
        }
    }
}

/// Contract source text plus its ordered initialization parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContractSpec {
    pub code: String,
    pub init: Vec<InitParam>,
}

impl ContractSpec {
    pub fn new(code: impl Into<String>, init: Vec<InitParam>) -> Self {
        Self {
            code: code.into(),
            init,
        }
    }

    /// Read the source from `path`; contents are treated as opaque text.
    pub async fn from_file(path: &Path, init: Vec<InitParam>) -> DeployResult<Self> {
        let code = tokio::fs::read_to_string(path).await?;
        tracing::debug!(path = %path.display(), bytes = code.len(), "Contract source loaded");
        Ok(Self { code, init })
    }

    /// A deployable spec has code and at least one init parameter.
    pub fn validate(&self) -> DeployResult<()> {
        if self.code.is_empty() || self.init.is_empty() {
            return Err(DeployError::MissingCodeOrInit);
        }
        Ok(())
    }
}

/// Chain-facing fields of a deployment. Numbers are decimal strings and
/// are copied into the transaction verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeploymentParameters {
    /// Packed chain id and message version.
    pub version: String,
    /// Must be the on-chain nonce + 1.
    pub nonce: String,
    pub gas_price: String,
    pub gas_limit: String,
    /// Compressed public key hex. Empty lets the signer fill it in.
    pub sender_pub_key: String,
}

/// Build the unsigned deployment transaction for `spec`.
///
/// This is the only validation performed before signing and it never
/// touches the network.
pub fn build_deployment(
    spec: &ContractSpec,
    params: &DeploymentParameters,
) -> DeployResult<Transaction> {
    spec.validate()?;

    Ok(Transaction::new(
        params,
        AccountAddress::ZERO,
        "0".to_string(),
        spec.code.replace(ESCAPED_BACKSLASH, ""),
        spec.init.clone(),
    ))
}
