pub mod call;
pub mod record;
pub mod transaction;

use std::{fmt, str::FromStr};

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

use crate::basic_elements::args::{Args, Serializable};

pub use call::{CallDescriptor, CallKind, FunctionSignature, QueryResult};
pub use record::{FailureReason, Receipt, ReceiptStatus, TransactionRecord};
pub use transaction::{ContractQuery, QueryOutcome, SignedTransaction, SubmitAck, TransactionBody};

/// Wire type of a contract parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueTag {
    String,
    Uint256,
    Int256,
    Bool,
    Uint256Array,
    StringArray,
    Bytes,
}

impl ValueTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueTag::String => "string",
            ValueTag::Uint256 => "uint256",
            ValueTag::Int256 => "int256",
            ValueTag::Bool => "bool",
            ValueTag::Uint256Array => "uint256[]",
            ValueTag::StringArray => "string[]",
            ValueTag::Bytes => "bytes",
        }
    }
}

impl fmt::Display for ValueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueTag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ValueTag::String),
            "uint256" | "uint" => Ok(ValueTag::Uint256),
            "int256" | "int" => Ok(ValueTag::Int256),
            "bool" => Ok(ValueTag::Bool),
            "uint256[]" => Ok(ValueTag::Uint256Array),
            "string[]" => Ok(ValueTag::StringArray),
            "bytes" => Ok(ValueTag::Bytes),
            other => bail!("Unknown value type '{}'", other),
        }
    }
}

/// `shard.realm.num` identifier shared by accounts and contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
}

impl EntityId {
    pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }

    /// 20-byte hex form used by EVM tooling: 4 bytes shard, 8 realm, 8 num.
    /// Fails for shards that do not fit in 4 bytes.
    pub fn to_solidity_address(&self) -> Result<String> {
        let shard = u32::try_from(self.shard).with_context(|| {
            format!("Shard of {} does not fit a solidity address", self)
        })?;
        Ok(format!("{:08x}{:016x}{:016x}", shard, self.realm, self.num))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl FromStr for EntityId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        let &[shard, realm, num] = parts.as_slice() else {
            bail!("Invalid entity id '{}': expected shard.realm.num", s);
        };
        let parse = |part: &str, name: &str| {
            part.parse::<u64>()
                .with_context(|| format!("Invalid {} in entity id '{}'", name, s))
        };
        Ok(Self::new(
            parse(shard, "shard")?,
            parse(realm, "realm")?,
            parse(num, "num")?,
        ))
    }
}

impl Serializable for EntityId {
    fn serialize(&self) -> Vec<u8> {
        let mut args = Args::new();
        args.add_u64(self.shard).add_u64(self.realm).add_u64(self.num);
        args.into_bytes()
    }

    fn deserialize(data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let tail = data
            .get(offset..)
            .ok_or_else(|| anyhow!("Entity id offset {} is out of bounds", offset))?;
        let mut args = Args::from_bytes(tail.to_vec());
        let id = Self::new(args.next_u64()?, args.next_u64()?, args.next_u64()?);
        Ok((id, offset + args.get_offset()))
    }
}

macro_rules! entity_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub EntityId);

        impl $name {
            pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
                Self(EntityId::new(shard, realm, num))
            }

            pub fn entity_id(&self) -> EntityId {
                self.0
            }

            pub fn to_solidity_address(&self) -> Result<String> {
                self.0.to_solidity_address()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }

        impl From<EntityId> for $name {
            fn from(id: EntityId) -> Self {
                Self(id)
            }
        }

        impl Serializable for $name {
            fn serialize(&self) -> Vec<u8> {
                Serializable::serialize(&self.0)
            }

            fn deserialize(data: &[u8], offset: usize) -> Result<(Self, usize)> {
                let (id, offset) = <EntityId as Serializable>::deserialize(data, offset)?;
                Ok((Self(id), offset))
            }
        }
    };
}

entity_newtype!(
    /// Ledger account that pays for and signs transactions.
    AccountId
);

entity_newtype!(
    /// Reference to a deployed contract instance. Produced once by deployment
    /// and reused for every later call.
    ContractHandle
);

/// Client-chosen transaction identity: the paying account plus a nonce.
///
/// The id is fixed before submission, so a lost response can be resolved by
/// looking the id up instead of resubmitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId {
    pub payer: AccountId,
    pub nonce: u64,
}

impl TransactionId {
    pub fn new(payer: AccountId, nonce: u64) -> Self {
        Self { payer, nonce }
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.payer, self.nonce)
    }
}

impl FromStr for TransactionId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (payer, nonce) = s
            .split_once('@')
            .ok_or_else(|| anyhow!("Invalid transaction id '{}': expected payer@nonce", s))?;
        Ok(Self {
            payer: payer.parse()?,
            nonce: nonce
                .parse()
                .with_context(|| format!("Invalid nonce in transaction id '{}'", s))?,
        })
    }
}

impl Serializable for TransactionId {
    fn serialize(&self) -> Vec<u8> {
        let mut args = Args::new();
        args.add_serializable(&self.payer).add_u64(self.nonce);
        args.into_bytes()
    }

    fn deserialize(data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (payer, offset) = <AccountId as Serializable>::deserialize(data, offset)?;
        let tail = data
            .get(offset..)
            .ok_or_else(|| anyhow!("Transaction id offset {} is out of bounds", offset))?;
        let mut args = Args::from_bytes(tail.to_vec());
        let nonce = args.next_u64().context("Failed to read transaction nonce")?;
        Ok((Self { payer, nonce }, offset + args.get_offset()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_text_form() -> Result<()> {
        let id: EntityId = "0.0.4521".parse()?;
        assert_eq!(id, EntityId::new(0, 0, 4521));
        assert_eq!(id.to_string(), "0.0.4521");
        assert!("0.0".parse::<EntityId>().is_err());
        assert!("0.x.1".parse::<EntityId>().is_err());
        Ok(())
    }

    #[test]
    fn solidity_address_is_twenty_bytes() -> Result<()> {
        let handle = ContractHandle::new(0, 0, 0x1234);
        let address = handle.to_solidity_address()?;
        assert_eq!(address.len(), 40);
        assert!(address.ends_with("1234"));
        Ok(())
    }

    #[test]
    fn oversized_shard_has_no_solidity_address() {
        let handle = ContractHandle::new(u64::from(u32::MAX) + 1, 0, 7);
        assert!(handle.to_solidity_address().is_err());
        assert!(ContractHandle::new(u64::from(u32::MAX), 0, 7).to_solidity_address().is_ok());
    }

    #[test]
    fn handles_keep_their_binary_form() -> Result<()> {
        let contract = ContractHandle::new(1, 2, 3);
        let account = AccountId::new(0, 0, 1001);

        let mut args = Args::new();
        args.add_serializable(&contract).add_serializable(&account);
        let mut reader = Args::from_bytes(args.serialize());
        assert_eq!(reader.next_serializable::<ContractHandle>()?, contract);
        assert_eq!(reader.next_serializable::<AccountId>()?, account);
        assert_eq!(reader.remaining(), 0);
        Ok(())
    }

    #[test]
    fn transaction_id_text_and_binary_forms() -> Result<()> {
        let id = TransactionId::new(AccountId::new(0, 0, 2), 99);
        assert_eq!(id.to_string(), "0.0.2@99");
        assert_eq!("0.0.2@99".parse::<TransactionId>()?, id);

        let mut args = Args::new();
        args.add_serializable(&id).add_u8(7);
        let mut reader = Args::from_bytes(args.serialize());
        assert_eq!(reader.next_serializable::<TransactionId>()?, id);
        assert_eq!(reader.next_u8()?, 7);
        Ok(())
    }

    #[test]
    fn value_tag_names() -> Result<()> {
        for tag in [
            ValueTag::String,
            ValueTag::Uint256,
            ValueTag::Int256,
            ValueTag::Bool,
            ValueTag::Uint256Array,
            ValueTag::StringArray,
            ValueTag::Bytes,
        ] {
            assert_eq!(tag.as_str().parse::<ValueTag>()?, tag);
        }
        assert!("address".parse::<ValueTag>().is_err());
        Ok(())
    }
}
