//! Wallet management and transaction signing.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized
//! - `Debug` output of accounts omits the secret

use std::collections::HashMap;

use k256::{PublicKey, SecretKey};

use crate::blockchain::address::{encode_public_key, parse_private_key, AccountAddress};
use crate::blockchain::client::ChainClient;
use crate::blockchain::schnorr;
use crate::blockchain::transaction::{Transaction, TxState};
use crate::blockchain::types::{DeployError, DeployResult};

/// Default environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "DEPLOYER_PRIVATE_KEY";

/// One keypair and its derived address.
#[derive(Clone)]
pub struct Account {
    secret: SecretKey,
    public_key: PublicKey,
    public_key_hex: String,
    address: AccountAddress,
}

impl Account {
    /// Derive an account from a hex-encoded private key.
    pub fn from_private_key(private_key_hex: &str) -> DeployResult<Self> {
        let secret = parse_private_key(private_key_hex)?;
        let public_key = secret.public_key();
        Ok(Self {
            public_key_hex: encode_public_key(&public_key),
            address: AccountAddress::from_public_key(&public_key),
            public_key,
            secret,
        })
    }

    pub fn address(&self) -> AccountAddress {
        self.address
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Compressed public key, lowercase hex.
    pub fn public_key_hex(&self) -> &str {
        &self.public_key_hex
    }

    /// Sign arbitrary bytes, returning the 64-byte signature as hex.
    pub fn sign(&self, message: &[u8]) -> String {
        schnorr::sign(&self.secret, message).to_hex()
    }

    fn matches(&self, identifier: &str) -> bool {
        let id = identifier.trim();
        let id = id.strip_prefix("0x").unwrap_or(id);
        id.eq_ignore_ascii_case(&self.public_key_hex)
            || identifier
                .parse::<AccountAddress>()
                .map(|a| a == self.address)
                .unwrap_or(false)
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address.to_hex())
            .field("public_key", &self.public_key_hex)
            .finish_non_exhaustive()
    }
}

/// In-memory set of accounts with a designated default.
#[derive(Debug, Clone, Default)]
pub struct Wallet {
    accounts: HashMap<AccountAddress, Account>,
    default: Option<AccountAddress>,
}

impl Wallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a single-account wallet from the named environment variable.
    pub fn from_env(var_name: &str) -> DeployResult<Self> {
        let private_key = std::env::var(var_name).map_err(|_| {
            DeployError::InvalidKey(format!("Environment variable {} not set", var_name))
        })?;

        let mut wallet = Self::new();
        wallet.add_by_private_key(&private_key)?;
        Ok(wallet)
    }

    /// Import a private key. The first imported account becomes the default.
    pub fn add_by_private_key(&mut self, private_key_hex: &str) -> DeployResult<AccountAddress> {
        let account = Account::from_private_key(private_key_hex)?;
        let address = account.address();

        tracing::info!(
            address = %address,
            public_key = account.public_key_hex(),
            "Account imported"
        );

        self.accounts.insert(address, account);
        if self.default.is_none() {
            self.default = Some(address);
        }
        Ok(address)
    }

    /// Point the default account at an already imported address.
    pub fn set_default(&mut self, address: &str) -> DeployResult<()> {
        let parsed: AccountAddress = address.parse()?;
        if !self.accounts.contains_key(&parsed) {
            return Err(DeployError::UnknownAccount(address.to_string()));
        }
        self.default = Some(parsed);
        Ok(())
    }

    pub fn default_account(&self) -> Option<&Account> {
        self.default.as_ref().and_then(|a| self.accounts.get(a))
    }

    pub fn account(&self, address: &AccountAddress) -> Option<&Account> {
        self.accounts.get(address)
    }

    /// Look up an account by address (any accepted form) or public key hex.
    pub fn find(&self, identifier: &str) -> Option<&Account> {
        self.accounts.values().find(|a| a.matches(identifier))
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Sign `tx` in place with the account identified by `signer`.
    ///
    /// Fills in the sender public key when absent and fetches the nonce
    /// from the node when the transaction does not carry one.
    pub async fn sign_with(
        &self,
        tx: &mut Transaction,
        signer: &str,
        client: &ChainClient,
    ) -> DeployResult<()> {
        if tx.state() != TxState::Built {
            return Err(DeployError::Signing(format!(
                "transaction already past signing (state {:?})",
                tx.state()
            )));
        }

        let account = self
            .find(signer)
            .ok_or_else(|| DeployError::UnknownAccount(signer.to_string()))?;

        if tx.sender_pub_key.is_empty() {
            tx.sender_pub_key = account.public_key_hex().to_string();
        } else if !tx
            .sender_pub_key
            .trim_start_matches("0x")
            .eq_ignore_ascii_case(account.public_key_hex())
        {
            return Err(DeployError::Signing(format!(
                "sender public key does not belong to account {}",
                account.address()
            )));
        }

        if tx.nonce.is_empty() {
            let info = client.get_balance(&account.address()).await?;
            tx.nonce = info.next_nonce().to_string();
        }

        let message = tx.core_info_bytes()?;
        tx.attach_signature(account.sign(&message));

        tracing::debug!(
            address = %account.address(),
            nonce = %tx.nonce,
            "Transaction signed"
        );
        Ok(())
    }
}
