use anyhow::{Context, Result};
use tracing::info;

use crate::{
    basic_elements::keys::{PrivateKey, PublicKey, Signature},
    types::AccountId,
};

use super::traits::signer::TransactionSigner;

/// Signs with a locally held private key for a known account.
#[derive(Debug, Clone)]
pub struct OperatorSigner {
    account_id: AccountId,
    private_key: PrivateKey,
}

impl OperatorSigner {
    pub fn new(account_id: AccountId, private_key: PrivateKey) -> Self {
        Self {
            account_id,
            private_key,
        }
    }

    /// Parses the account id and any supported private key encoding.
    pub fn from_strings(account_id: &str, private_key: &str) -> Result<Self> {
        let account_id = account_id
            .parse::<AccountId>()
            .context("Invalid operator account id")?;
        let private_key = PrivateKey::parse(private_key).context("Invalid operator private key")?;

        info!(
            account_id = %account_id,
            public_key = %private_key.public_key(),
            "Operator signer initialized"
        );

        Ok(Self::new(account_id, private_key))
    }
}

impl TransactionSigner for OperatorSigner {
    fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    fn public_key(&self) -> PublicKey {
        self.private_key.public_key()
    }

    fn sign(&self, message: &[u8]) -> Result<Signature> {
        Ok(self.private_key.sign(message))
    }
}
