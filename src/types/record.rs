use std::fmt;

use serde::{Deserialize, Serialize};

use super::{EntityId, TransactionId};

/// Why the ledger refused or reverted a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    InsufficientGas,
    Reverted(String),
    Unauthorized,
    InvalidSignature,
    ContractNotFound,
    InvalidTransaction(String),
    Unknown { code: i32, message: String },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::InsufficientGas => f.write_str("INSUFFICIENT_GAS"),
            FailureReason::Reverted(message) => write!(f, "CONTRACT_REVERT_EXECUTED: {message}"),
            FailureReason::Unauthorized => f.write_str("UNAUTHORIZED"),
            FailureReason::InvalidSignature => f.write_str("INVALID_SIGNATURE"),
            FailureReason::ContractNotFound => f.write_str("INVALID_CONTRACT_ID"),
            FailureReason::InvalidTransaction(message) => {
                write!(f, "INVALID_TRANSACTION_BODY: {message}")
            }
            FailureReason::Unknown { code, message } => write!(f, "status {code}: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    Success,
    Failure(FailureReason),
}

impl fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiptStatus::Success => f.write_str("SUCCESS"),
            ReceiptStatus::Failure(reason) => fmt::Display::fmt(reason, f),
        }
    }
}

/// Finalized outcome of a state-changing call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub transaction_id: TransactionId,
    pub status: ReceiptStatus,
    /// Entity created by the transaction, e.g. the contract of a deployment.
    pub resource_id: Option<EntityId>,
    pub gas_used: u64,
}

impl Receipt {
    pub fn is_success(&self) -> bool {
        self.status == ReceiptStatus::Success
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match &self.status {
            ReceiptStatus::Success => None,
            ReceiptStatus::Failure(reason) => Some(reason),
        }
    }
}

/// Raw record the ledger keeps for each finalized transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: TransactionId,
    pub status: i32,
    pub error_message: String,
    pub created_entity: Option<EntityId>,
    pub gas_used: u64,
    pub consensus_sequence: u64,
}
