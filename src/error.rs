use thiserror::Error;

use crate::types::{FailureReason, TransactionId};

/// Missing or malformed environment configuration. Always fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(String),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Failures of the ledger transport itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// The request never left the client; safe to retry.
    #[error("ledger node unreachable: {0}")]
    Unreachable(String),

    /// The request may have reached the node before the connection broke.
    #[error("request interrupted: {0}")]
    Interrupted(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl NetworkError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, NetworkError::Unreachable(_))
    }
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{function}: invalid call: {reason}")]
    Validation { function: String, reason: String },

    #[error("{function}: transport failed after {attempts} attempts: {source}")]
    Transport {
        function: String,
        attempts: u32,
        #[source]
        source: NetworkError,
    },

    /// Submitted, but no record could be found. The call may or may not have
    /// been applied.
    #[error("{function}: outcome of transaction {transaction_id} is unknown")]
    Ambiguous {
        function: String,
        transaction_id: TransactionId,
    },

    #[error("{function}: query rejected: {reason}")]
    QueryRejected {
        function: String,
        reason: FailureReason,
    },

    #[error("deployment rejected: {0}")]
    DeployRejected(FailureReason),

    #[error("{function}: failed to decode ledger response: {source}")]
    Decode {
        function: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to sign transaction: {0}")]
    Signing(#[source] anyhow::Error),

    #[error("failed to read bytecode: {0}")]
    Bytecode(#[source] anyhow::Error),
}

impl DispatchError {
    pub fn validation(function: &str, reason: impl Into<String>) -> Self {
        DispatchError::Validation {
            function: function.to_string(),
            reason: reason.into(),
        }
    }

    pub fn decode(function: &str, source: anyhow::Error) -> Self {
        DispatchError::Decode {
            function: function.to_string(),
            source,
        }
    }

    /// Name of the contract function the failure belongs to, when known.
    pub fn function(&self) -> Option<&str> {
        match self {
            DispatchError::Validation { function, .. }
            | DispatchError::Transport { function, .. }
            | DispatchError::Ambiguous { function, .. }
            | DispatchError::QueryRejected { function, .. }
            | DispatchError::Decode { function, .. } => Some(function),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccountId;

    #[test]
    fn only_unreachable_is_retryable() {
        assert!(NetworkError::Unreachable("refused".into()).is_retryable());
        assert!(!NetworkError::Interrupted("reset".into()).is_retryable());
        assert!(!NetworkError::Protocol("bad frame".into()).is_retryable());
    }

    #[test]
    fn messages_name_the_function() {
        let error = DispatchError::Ambiguous {
            function: "addBill".to_string(),
            transaction_id: TransactionId::new(AccountId::new(0, 0, 2), 5),
        };
        assert_eq!(error.function(), Some("addBill"));
        assert_eq!(
            error.to_string(),
            "addBill: outcome of transaction 0.0.2@5 is unknown"
        );

        let missing: DispatchError = ConfigError::Missing("MY_ACCOUNT_ID".into()).into();
        assert_eq!(missing.function(), None);
        assert!(missing.to_string().contains("MY_ACCOUNT_ID"));
    }
}
