pub mod dispatcher;
pub mod grpc_client;
pub mod local_ledger;
pub mod proto;

use std::future::Future;

use crate::{
    error::NetworkError,
    types::{
        ContractQuery, QueryOutcome, SignedTransaction, SubmitAck, TransactionId, TransactionRecord,
    },
};

/// Transport to a ledger node.
///
/// Implementations only move bytes; retries, deadlines and receipt polling
/// belong to the dispatcher.
pub trait LedgerNetwork: Send + Sync {
    /// Hands a signed transaction to the node for consensus.
    fn submit(
        &self,
        transaction: &SignedTransaction,
    ) -> impl Future<Output = Result<SubmitAck, NetworkError>> + Send;

    /// Finalized record of a transaction, `None` while it is still unknown.
    fn transaction_record(
        &self,
        transaction_id: &TransactionId,
    ) -> impl Future<Output = Result<Option<TransactionRecord>, NetworkError>> + Send;

    /// Runs a read-only call against current state.
    fn call_query(
        &self,
        query: &ContractQuery,
    ) -> impl Future<Output = Result<QueryOutcome, NetworkError>> + Send;
}
