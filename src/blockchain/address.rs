//! Account addresses and key-to-address conversion.
//!
//! An address is the last 20 bytes of SHA-256 over the compressed public key.
//! It has three renderings: plain lowercase hex (what the node and wallet use
//! internally), a `0x` checksummed form, and bech32 with the `zil` prefix.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::hex;
use bech32::{Bech32, Hrp};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use sha2::{Digest, Sha256};

use crate::blockchain::types::DeployError;

const ADDRESS_LEN: usize = 20;
const BECH32_HRP: Hrp = Hrp::parse_unchecked("zil");

/// A 20-byte account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AccountAddress([u8; ADDRESS_LEN]);

impl AccountAddress {
    /// Sentinel recipient of deployment transactions.
    pub const ZERO: AccountAddress = AccountAddress([0u8; ADDRESS_LEN]);

    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Derive the address of a compressed SEC1 public key.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let compressed = public_key.to_encoded_point(true);
        Self::from_digest_tail(&Sha256::digest(compressed.as_bytes()))
    }

    fn from_digest_tail(digest: &[u8]) -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest[digest.len() - ADDRESS_LEN..]);
        Self(bytes)
    }

    /// Address of the contract created by `sender` deploying with `tx_nonce`.
    pub fn for_contract(sender: &AccountAddress, tx_nonce: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(sender.0);
        hasher.update(tx_nonce.saturating_sub(1).to_be_bytes());
        Self::from_digest_tail(&hasher.finalize())
    }

    /// Lowercase hex without prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// `0x`-prefixed mixed-case checksum form.
    pub fn to_checksum(&self) -> String {
        let digest = Sha256::digest(self.0);
        let lower = self.to_hex();
        let mut out = String::with_capacity(2 + lower.len());
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            if c.is_ascii_digit() {
                out.push(c);
                continue;
            }
            let bit = 255 - 6 * i;
            let byte = digest[31 - bit / 8];
            if (byte >> (bit % 8)) & 1 == 1 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }

    /// Bech32 form with the `zil` human-readable part.
    pub fn to_bech32(&self) -> String {
        // encoding 20 bytes under a 3-char HRP cannot exceed the length limit
        bech32::encode::<Bech32>(BECH32_HRP, &self.0).unwrap_or_default()
    }

    fn from_hex_str(s: &str) -> Result<Self, DeployError> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw)
            .map_err(|e| DeployError::UnknownAccount(format!("{} ({})", s, e)))?;
        let bytes: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            DeployError::UnknownAccount(format!("{} (expected {} bytes)", s, ADDRESS_LEN))
        })?;
        Ok(Self(bytes))
    }

    fn from_bech32_str(s: &str) -> Result<Self, DeployError> {
        let (hrp, data) = bech32::decode(s)
            .map_err(|e| DeployError::UnknownAccount(format!("{} ({})", s, e)))?;
        if hrp != BECH32_HRP {
            return Err(DeployError::UnknownAccount(format!(
                "{} (unexpected prefix '{}')",
                s, hrp
            )));
        }
        let bytes: [u8; ADDRESS_LEN] = data.try_into().map_err(|_| {
            DeployError::UnknownAccount(format!("{} (expected {} bytes)", s, ADDRESS_LEN))
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for AccountAddress {
    type Err = DeployError;

    /// Accepts plain hex, `0x` hex (any case) and `zil1` bech32.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.to_ascii_lowercase().starts_with("zil1") {
            Self::from_bech32_str(s)
        } else {
            Self::from_hex_str(s)
        }
    }
}

/// Parse a hex private key (optional `0x`, any case) into a secret key.
pub fn parse_private_key(private_key_hex: &str) -> Result<SecretKey, DeployError> {
    let raw = private_key_hex.trim();
    let raw = raw.strip_prefix("0x").unwrap_or(raw);
    let bytes = hex::decode(raw)
        .map_err(|e| DeployError::InvalidKey(format!("not valid hex: {}", e)))?;
    if bytes.len() != 32 {
        return Err(DeployError::InvalidKey(format!(
            "expected 32 bytes, got {}",
            bytes.len()
        )));
    }
    SecretKey::from_slice(&bytes)
        .map_err(|_| DeployError::InvalidKey("not a valid secp256k1 scalar".to_string()))
}

/// Direct key-to-address conversion, independent of any wallet.
pub fn address_from_private_key(private_key_hex: &str) -> Result<AccountAddress, DeployError> {
    let secret = parse_private_key(private_key_hex)?;
    Ok(AccountAddress::from_public_key(&secret.public_key()))
}

/// Lowercase hex of the compressed public key.
pub fn encode_public_key(public_key: &PublicKey) -> String {
    hex::encode(public_key.to_encoded_point(true).as_bytes())
}

/// Parse a hex compressed (or uncompressed) SEC1 public key.
pub fn parse_public_key(public_key_hex: &str) -> Result<PublicKey, DeployError> {
    let raw = public_key_hex.strip_prefix("0x").unwrap_or(public_key_hex);
    let bytes = hex::decode(raw)
        .map_err(|e| DeployError::Signing(format!("sender public key is not hex: {}", e)))?;
    PublicKey::from_sec1_bytes(&bytes)
        .map_err(|_| DeployError::Signing("sender public key is not a curve point".to_string()))
}
