use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::types::{FailureReason, Receipt, ReceiptStatus, TransactionRecord};

/// Status codes shared by precheck responses, records and query outcomes.
pub mod status {
    pub const SUCCESS: i32 = 0;
    pub const INSUFFICIENT_GAS: i32 = 1;
    pub const CONTRACT_REVERT_EXECUTED: i32 = 2;
    pub const UNAUTHORIZED: i32 = 3;
    pub const INVALID_SIGNATURE: i32 = 4;
    pub const INVALID_CONTRACT_ID: i32 = 5;
    pub const INVALID_TRANSACTION_BODY: i32 = 6;
    pub const DUPLICATE_TRANSACTION: i32 = 7;
}

pub fn failure_from_status(code: i32, message: &str) -> FailureReason {
    match code {
        status::INSUFFICIENT_GAS => FailureReason::InsufficientGas,
        status::CONTRACT_REVERT_EXECUTED => FailureReason::Reverted(message.to_string()),
        status::UNAUTHORIZED => FailureReason::Unauthorized,
        status::INVALID_SIGNATURE => FailureReason::InvalidSignature,
        status::INVALID_CONTRACT_ID => FailureReason::ContractNotFound,
        status::INVALID_TRANSACTION_BODY => FailureReason::InvalidTransaction(message.to_string()),
        code => FailureReason::Unknown {
            code,
            message: message.to_string(),
        },
    }
}

/// Inverse of [`failure_from_status`], used by ledgers that produce records.
pub fn status_of(reason: &FailureReason) -> i32 {
    match reason {
        FailureReason::InsufficientGas => status::INSUFFICIENT_GAS,
        FailureReason::Reverted(_) => status::CONTRACT_REVERT_EXECUTED,
        FailureReason::Unauthorized => status::UNAUTHORIZED,
        FailureReason::InvalidSignature => status::INVALID_SIGNATURE,
        FailureReason::ContractNotFound => status::INVALID_CONTRACT_ID,
        FailureReason::InvalidTransaction(_) => status::INVALID_TRANSACTION_BODY,
        FailureReason::Unknown { code, .. } => *code,
    }
}

pub fn receipt_from_record(record: &TransactionRecord) -> Receipt {
    let status = if record.status == status::SUCCESS {
        ReceiptStatus::Success
    } else {
        ReceiptStatus::Failure(failure_from_status(record.status, &record.error_message))
    };

    Receipt {
        transaction_id: record.transaction_id,
        status,
        resource_id: record.created_entity,
        gas_used: record.gas_used,
    }
}

/// Reads a compiled contract artifact. The content is treated as opaque bytes.
pub async fn read_bytecode(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let bytecode = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read bytecode from {}", path.display()))?;

    if bytecode.is_empty() {
        bail!("Bytecode file {} is empty", path.display());
    }

    debug!(path = %path.display(), size = bytecode.len(), "Loaded bytecode");
    Ok(bytecode)
}
