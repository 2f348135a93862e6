//! Transaction record, wire payload, submission, and confirmation monitoring.
//!
//! # Responsibilities
//! - Hold a transaction through `built → signed → submitted → confirmed | failed`
//! - Encode the core fields that get signed
//! - Serialize the `CreateTransaction` payload and parse its response
//! - Poll for a receipt within an attempt budget
//!
//! A timed-out poll leaves the transaction `submitted`; it is never treated
//! as confirmed.

use std::time::Duration;

use k256::elliptic_curve::sec1::ToEncodedPoint;
use prost::Message;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::blockchain::address::{parse_public_key, AccountAddress};
use crate::blockchain::client::ChainClient;
use crate::blockchain::contract::{DeploymentParameters, InitParam};
use crate::blockchain::types::{ConfirmationStatus, DeployError, DeployResult, TxReceipt};

/// Lifecycle state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    Built,
    Signed,
    Submitted,
    Confirmed,
    Failed,
}

/// A transaction owned by the submitting workflow.
#[derive(Debug, Clone)]
pub struct Transaction {
    /// Hash assigned by the node on submission.
    pub id: Option<String>,
    pub version: String,
    pub nonce: String,
    pub to_addr: AccountAddress,
    pub amount: String,
    pub gas_price: String,
    pub gas_limit: String,
    pub sender_pub_key: String,
    pub signature: Option<String>,
    pub code: String,
    pub data: Vec<InitParam>,
    /// Address of the created contract, for deployments.
    pub contract_address: Option<String>,
    pub receipt: Option<TxReceipt>,
    state: TxState,
}

/// `bytes` wrapper used for keys and 128-bit amounts.
#[derive(Clone, PartialEq, Message)]
pub struct ByteArray {
    #[prost(bytes = "vec", required, tag = "1")]
    pub data: Vec<u8>,
}

/// The signed portion of a transaction.
#[derive(Clone, PartialEq, Message)]
pub struct ProtoTransactionCoreInfo {
    #[prost(uint32, optional, tag = "1")]
    pub version: Option<u32>,
    #[prost(uint64, optional, tag = "2")]
    pub nonce: Option<u64>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub toaddr: Option<Vec<u8>>,
    #[prost(message, optional, tag = "4")]
    pub senderpubkey: Option<ByteArray>,
    #[prost(message, optional, tag = "5")]
    pub amount: Option<ByteArray>,
    #[prost(message, optional, tag = "6")]
    pub gasprice: Option<ByteArray>,
    #[prost(uint64, optional, tag = "7")]
    pub gaslimit: Option<u64>,
    #[prost(bytes = "vec", optional, tag = "8")]
    pub code: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "9")]
    pub data: Option<Vec<u8>>,
}

/// JSON body of `CreateTransaction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    pub version: u32,
    pub nonce: u64,
    pub to_addr: String,
    pub amount: String,
    pub pub_key: String,
    pub gas_price: String,
    pub gas_limit: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: String,
    /// JSON text of the init parameter list.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data: String,
    pub signature: String,
    #[serde(default)]
    pub priority: bool,
}

impl TransactionPayload {
    /// Decode the init parameters carried in `data`.
    pub fn init_params(&self) -> serde_json::Result<Vec<InitParam>> {
        if self.data.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&self.data)
    }
}

fn parse_field<T: std::str::FromStr>(name: &str, value: &str) -> DeployResult<T> {
    value
        .parse()
        .map_err(|_| DeployError::Signing(format!("{} '{}' is not a valid number", name, value)))
}

fn amount_bytes(name: &str, value: &str) -> DeployResult<ByteArray> {
    let amount: u128 = parse_field(name, value)?;
    Ok(ByteArray {
        data: amount.to_be_bytes().to_vec(),
    })
}

impl Transaction {
    /// Create a transaction in the `built` state.
    pub fn new(
        params: &DeploymentParameters,
        to_addr: AccountAddress,
        amount: String,
        code: String,
        data: Vec<InitParam>,
    ) -> Self {
        Self {
            id: None,
            version: params.version.clone(),
            nonce: params.nonce.clone(),
            to_addr,
            amount,
            gas_price: params.gas_price.clone(),
            gas_limit: params.gas_limit.clone(),
            sender_pub_key: params.sender_pub_key.clone(),
            signature: None,
            code,
            data,
            contract_address: None,
            receipt: None,
            state: TxState::Built,
        }
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    /// Deployments are sent to the zero address.
    pub fn is_deployment(&self) -> bool {
        self.to_addr == AccountAddress::ZERO
    }

    /// JSON text of the init parameters, empty when there are none.
    pub fn data_json(&self) -> DeployResult<String> {
        if self.data.is_empty() {
            return Ok(String::new());
        }
        serde_json::to_string(&self.data)
            .map_err(|e| DeployError::Signing(format!("cannot encode init data: {}", e)))
    }

    /// Protobuf encoding of the fields covered by the signature.
    pub fn core_info_bytes(&self) -> DeployResult<Vec<u8>> {
        let sender = parse_public_key(&self.sender_pub_key)?;
        let data = self.data_json()?;

        let info = ProtoTransactionCoreInfo {
            version: Some(parse_field("version", &self.version)?),
            nonce: Some(parse_field("nonce", &self.nonce)?),
            toaddr: Some(self.to_addr.as_bytes().to_vec()),
            senderpubkey: Some(ByteArray {
                data: sender.to_encoded_point(true).as_bytes().to_vec(),
            }),
            amount: Some(amount_bytes("amount", &self.amount)?),
            gasprice: Some(amount_bytes("gas price", &self.gas_price)?),
            gaslimit: Some(parse_field("gas limit", &self.gas_limit)?),
            code: (!self.code.is_empty()).then(|| self.code.as_bytes().to_vec()),
            data: (!data.is_empty()).then(|| data.into_bytes()),
        };
        Ok(info.encode_to_vec())
    }

    pub(crate) fn attach_signature(&mut self, signature: String) {
        self.signature = Some(signature);
        self.state = TxState::Signed;
    }

    /// Wire payload for `CreateTransaction`. Requires a signature.
    pub fn to_payload(&self) -> DeployResult<TransactionPayload> {
        let signature = self
            .signature
            .clone()
            .ok_or_else(|| DeployError::Signing("transaction is not signed".to_string()))?;

        Ok(TransactionPayload {
            version: parse_field("version", &self.version)?,
            nonce: parse_field("nonce", &self.nonce)?,
            to_addr: self.to_addr.to_checksum()[2..].to_string(),
            amount: self.amount.clone(),
            pub_key: self.sender_pub_key.clone(),
            gas_price: self.gas_price.clone(),
            gas_limit: self.gas_limit.clone(),
            code: self.code.clone(),
            data: self.data_json()?,
            signature,
            priority: false,
        })
    }

    /// Send the signed transaction and record the assigned hash and, for
    /// deployments, the contract address.
    ///
    /// On any failure the transaction stays `signed`.
    pub async fn submit(&mut self, client: &ChainClient) -> DeployResult<()> {
        if self.state != TxState::Signed {
            return Err(DeployError::Signing(format!(
                "transaction must be signed before submission (state {:?})",
                self.state
            )));
        }

        let payload = self.to_payload()?;
        let result = client.create_transaction(&payload).await?;

        let hash = result
            .get("TranID")
            .and_then(serde_json::Value::as_str)
            .ok_or(DeployError::ResponseShape("TranID"))?
            .to_string();

        let contract_address = if self.is_deployment() {
            let reported = result
                .get("ContractAddress")
                .and_then(serde_json::Value::as_str)
                .ok_or(DeployError::ResponseShape("ContractAddress"))?
                .to_string();
            self.check_contract_address(&reported, payload.nonce);
            Some(reported)
        } else {
            None
        };

        if let Some(info) = result.get("Info").and_then(serde_json::Value::as_str) {
            tracing::debug!(tx_hash = %hash, info = info, "Node accepted transaction");
        }

        self.id = Some(hash);
        self.contract_address = contract_address;
        self.state = TxState::Submitted;
        Ok(())
    }

    fn check_contract_address(&self, reported: &str, nonce: u64) {
        let sender = match parse_public_key(&self.sender_pub_key) {
            Ok(key) => AccountAddress::from_public_key(&key),
            Err(_) => return,
        };
        let expected = AccountAddress::for_contract(&sender, nonce);
        match reported.parse::<AccountAddress>() {
            Ok(addr) if addr == expected => {}
            _ => tracing::warn!(
                reported = reported,
                expected = %expected,
                "Node reported a contract address different from the local derivation"
            ),
        }
    }

    /// Poll until the transaction has a receipt or the budget runs out.
    ///
    /// # Arguments
    /// * `max_attempts` - Number of status queries before giving up
    /// * `interval` - Delay between queries
    pub async fn confirm(
        &mut self,
        client: &ChainClient,
        max_attempts: u32,
        interval: Duration,
    ) -> DeployResult<ConfirmationStatus> {
        let tx_hash = match (&self.id, self.state) {
            (Some(id), TxState::Submitted) => id.clone(),
            _ => return Err(DeployError::NotSubmitted),
        };

        let receipt = poll_confirmation(client, &tx_hash, max_attempts, interval).await?;
        let status = ConfirmationStatus::from(&receipt);

        self.state = match status {
            ConfirmationStatus::Confirmed { .. } => TxState::Confirmed,
            ConfirmationStatus::Failed(_) => TxState::Failed,
        };
        self.receipt = Some(receipt);
        Ok(status)
    }
}

/// Query `GetTransaction` until a receipt appears.
///
/// An RPC error answer counts as pending: the node reports unknown hashes
/// that way until the transaction lands. Network failures and malformed
/// receipts end polling immediately.
pub async fn poll_confirmation(
    client: &ChainClient,
    tx_hash: &str,
    max_attempts: u32,
    interval: Duration,
) -> DeployResult<TxReceipt> {
    for attempt in 1..=max_attempts {
        match client.get_transaction(tx_hash).await {
            Ok(Some(receipt)) => {
                tracing::info!(
                    tx_hash = tx_hash,
                    attempt = attempt,
                    success = receipt.success,
                    "Transaction receipt received"
                );
                return Ok(receipt);
            }
            Ok(None) => {
                tracing::debug!(tx_hash = tx_hash, attempt = attempt, "Transaction pending");
            }
            Err(DeployError::Rpc(message)) => {
                tracing::debug!(
                    tx_hash = tx_hash,
                    attempt = attempt,
                    error = %message,
                    "Transaction not yet available"
                );
            }
            Err(e) => {
                tracing::warn!(
                    tx_hash = tx_hash,
                    attempt = attempt,
                    error = %e,
                    "Confirmation lookup failed"
                );
                return Err(e);
            }
        }

        if attempt < max_attempts {
            sleep(interval).await;
        }
    }

    Err(DeployError::ConfirmationTimeout {
        tx_hash: tx_hash.to_string(),
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::blockchain::address::{encode_public_key, parse_private_key};

    const TEST_PRIVATE_KEY: &str =
        "3375F915F3F9AE35E6B301B7670F53AD1A5BE15D8221EC7FD5E503F21D3450C8";

    fn built() -> Transaction {
        let secret = parse_private_key(TEST_PRIVATE_KEY).unwrap();
        let params = DeploymentParameters {
            version: "21823489".into(),
            nonce: "6".into(),
            gas_price: "2000000000".into(),
            gas_limit: "50000".into(),
            sender_pub_key: encode_public_key(&secret.public_key()),
        };
        Transaction::new(
            &params,
            AccountAddress::ZERO,
            "0".into(),
            "scilla_version 0".into(),
            vec![InitParam::new("_scilla_version", "Uint32", "0")],
        )
    }

    #[test]
    fn test_payload_requires_signature() {
        let tx = built();
        assert!(matches!(tx.to_payload(), Err(DeployError::Signing(_))));
    }

    #[test]
    fn test_payload_round_trip() {
        let mut tx = built();
        tx.attach_signature("ab".repeat(64));
        assert_eq!(tx.state(), TxState::Signed);

        let json = serde_json::to_string(&tx.to_payload().unwrap()).unwrap();
        let parsed: TransactionPayload = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.code, tx.code);
        assert_eq!(parsed.init_params().unwrap(), tx.data);
        assert_eq!(parsed.gas_price, "2000000000");
        assert_eq!(parsed.gas_limit, "50000");
        assert_eq!(parsed.nonce, 6);
        assert_eq!(parsed.version, 21_823_489);
        assert_eq!(parsed.to_addr, "0000000000000000000000000000000000000000");
    }

    #[test]
    fn test_payload_field_names() {
        let mut tx = built();
        tx.attach_signature("cd".repeat(64));
        let value = serde_json::to_value(tx.to_payload().unwrap()).unwrap();
        for key in ["version", "nonce", "toAddr", "amount", "pubKey", "gasPrice", "gasLimit", "code", "data", "signature", "priority"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_core_info_encoding() {
        let tx = built();
        let bytes = tx.core_info_bytes().unwrap();
        let decoded = ProtoTransactionCoreInfo::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded.version, Some(21_823_489));
        assert_eq!(decoded.nonce, Some(6));
        assert_eq!(decoded.toaddr, Some(vec![0u8; 20]));
        assert_eq!(decoded.senderpubkey.unwrap().data.len(), 33);
        assert_eq!(decoded.gasprice.unwrap().data, 2_000_000_000u128.to_be_bytes().to_vec());
        assert_eq!(decoded.gaslimit, Some(50_000));
        assert_eq!(decoded.code, Some(b"scilla_version 0".to_vec()));
        assert!(decoded.data.is_some());
    }

    #[test]
    fn test_core_info_rejects_bad_nonce() {
        let mut tx = built();
        tx.nonce = "six".into();
        assert!(matches!(tx.core_info_bytes(), Err(DeployError::Signing(_))));
    }
}
