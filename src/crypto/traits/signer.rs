use anyhow::Result;

use crate::{
    basic_elements::keys::{PublicKey, Signature},
    types::AccountId,
};

/// Anything that can sign transactions on behalf of a ledger account.
///
/// The operator key from the environment is one implementation; a wallet
/// holding a user's key is another.
pub trait TransactionSigner: Send + Sync {
    fn account_id(&self) -> &AccountId;

    fn public_key(&self) -> PublicKey;

    fn sign(&self, message: &[u8]) -> Result<Signature>;
}
