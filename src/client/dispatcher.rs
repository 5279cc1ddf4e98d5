use std::{path::Path, sync::Arc};

use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::{
    basic_elements::{
        serializers::bytes_to_u64,
        typed_value::{TypedValue, decode_values, encode_values},
    },
    config::DispatcherConfig,
    crypto::traits::signer::TransactionSigner,
    error::{DispatchError, NetworkError},
    helpers::records::{failure_from_status, read_bytecode, receipt_from_record, status},
    types::{
        AccountId, CallDescriptor, CallKind, ContractHandle, ContractQuery, QueryOutcome,
        QueryResult, Receipt, ReceiptStatus, SignedTransaction, SubmitAck, TransactionBody,
        TransactionId, TransactionRecord, transaction::CONTRACT_CREATE_FUNCTION,
    },
};

use super::LedgerNetwork;

/// Result of handing a transaction to the node.
enum Submission {
    Acknowledged(SubmitAck),
    /// The request may have reached the node; only a record lookup can tell.
    Unconfirmed,
}

/// Builds, signs and submits contract calls, then waits for their outcome.
pub struct Dispatcher<N> {
    network: Arc<N>,
    signer: Arc<dyn TransactionSigner>,
    config: DispatcherConfig,
}

impl<N> Clone for Dispatcher<N> {
    fn clone(&self) -> Self {
        Self {
            network: Arc::clone(&self.network),
            signer: Arc::clone(&self.signer),
            config: self.config.clone(),
        }
    }
}

impl<N: LedgerNetwork> Dispatcher<N> {
    pub fn new(network: N, signer: impl TransactionSigner + 'static, config: DispatcherConfig) -> Self {
        Self::from_shared(Arc::new(network), Arc::new(signer), config)
    }

    pub fn from_shared(
        network: Arc<N>,
        signer: Arc<dyn TransactionSigner>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            network,
            signer,
            config,
        }
    }

    /// Same network client, different signing account.
    pub fn with_signer(&self, signer: Arc<dyn TransactionSigner>) -> Self {
        Self {
            network: Arc::clone(&self.network),
            signer,
            config: self.config.clone(),
        }
    }

    pub fn with_config(&self, config: DispatcherConfig) -> Self {
        Self {
            config,
            ..self.clone()
        }
    }

    pub fn network(&self) -> &Arc<N> {
        &self.network
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn account_id(&self) -> &AccountId {
        self.signer.account_id()
    }

    /// Deploys a new, independent contract instance.
    pub async fn deploy(
        &self,
        bytecode: &[u8],
        constructor_parameters: &[TypedValue],
        gas: u64,
    ) -> Result<ContractHandle, DispatchError> {
        if gas == 0 {
            return Err(DispatchError::validation(
                CONTRACT_CREATE_FUNCTION,
                "gas limit must be positive",
            ));
        }
        if bytecode.is_empty() {
            return Err(DispatchError::validation(
                CONTRACT_CREATE_FUNCTION,
                "bytecode is empty",
            ));
        }

        let constructor_parameters = encode_values(constructor_parameters)
            .map_err(|e| DispatchError::validation(CONTRACT_CREATE_FUNCTION, format!("{e:#}")))?;
        let body = TransactionBody::ContractCreate {
            bytecode: bytecode.to_vec(),
            constructor_parameters,
            gas,
        };

        let receipt = self.submit_and_confirm(body, None).await?;
        match receipt.status {
            ReceiptStatus::Failure(reason) => {
                error!(reason = %reason, transaction_id = %receipt.transaction_id, "Deployment rejected");
                Err(DispatchError::DeployRejected(reason))
            }
            ReceiptStatus::Success => {
                let contract = receipt.resource_id.map(ContractHandle::from).ok_or_else(|| {
                    DispatchError::decode(
                        CONTRACT_CREATE_FUNCTION,
                        anyhow::anyhow!("record of {} has no contract id", receipt.transaction_id),
                    )
                })?;
                info!(
                    contract = %contract,
                    solidity_address = ?contract.to_solidity_address().ok(),
                    "Contract deployed"
                );
                Ok(contract)
            }
        }
    }

    pub async fn deploy_from_file(
        &self,
        path: impl AsRef<Path>,
        constructor_parameters: &[TypedValue],
        gas: u64,
    ) -> Result<ContractHandle, DispatchError> {
        let bytecode = read_bytecode(path).await.map_err(DispatchError::Bytecode)?;
        self.deploy(&bytecode, constructor_parameters, gas).await
    }

    /// Runs a state-changing call and waits for its receipt.
    ///
    /// Ledger-side rejections come back as a failed [`Receipt`]; an `Err` means
    /// the call never reached the ledger or its outcome is unknown.
    pub async fn execute(&self, call: &CallDescriptor) -> Result<Receipt, DispatchError> {
        if call.kind() != CallKind::Execute {
            return Err(DispatchError::validation(
                call.function(),
                "read-only function must be dispatched with query",
            ));
        }

        let parameters = call
            .encoded_parameters()
            .map_err(|e| DispatchError::validation(call.function(), format!("{e:#}")))?;
        let body = TransactionBody::ContractCall {
            contract: call.target(),
            function: call.function().to_string(),
            parameters,
            gas: call.gas_limit(),
        };

        let receipt = self.submit_and_confirm(body, call.idempotency_key()).await?;
        match receipt.failure() {
            None => info!(
                function = call.function(),
                contract = %call.target(),
                transaction_id = %receipt.transaction_id,
                gas_used = receipt.gas_used,
                "Call succeeded"
            ),
            Some(reason) => warn!(
                function = call.function(),
                contract = %call.target(),
                transaction_id = %receipt.transaction_id,
                reason = %reason,
                "Call failed on ledger"
            ),
        }
        Ok(receipt)
    }

    /// Runs a read-only call. Never creates a transaction.
    pub async fn query(&self, call: &CallDescriptor) -> Result<QueryResult, DispatchError> {
        if call.kind() != CallKind::Query {
            return Err(DispatchError::validation(
                call.function(),
                "state-changing function must be dispatched with execute",
            ));
        }

        let parameters = call
            .encoded_parameters()
            .map_err(|e| DispatchError::validation(call.function(), format!("{e:#}")))?;
        let query = ContractQuery {
            contract: call.target(),
            function: call.function().to_string(),
            parameters,
            gas: call.gas_limit(),
            sender: *self.signer.account_id(),
        };

        let outcome = self.query_with_retry(&query).await?;
        if outcome.status != status::SUCCESS {
            let reason = failure_from_status(outcome.status, &outcome.error_message);
            warn!(function = call.function(), contract = %call.target(), reason = %reason, "Query rejected");
            return Err(DispatchError::QueryRejected {
                function: call.function().to_string(),
                reason,
            });
        }

        let values = decode_values(&outcome.result, call.returns())
            .map_err(|e| DispatchError::decode(call.function(), e))
            .inspect_err(|e| error!(function = call.function(), error = %e, "Query result undecodable"))?;

        debug!(function = call.function(), values = values.len(), "Query answered");
        Ok(QueryResult::new(values))
    }

    /// Keyed calls get a nonce derived from the key and the call itself, so a
    /// resubmission after a lost response carries the same id and is
    /// deduplicated by the ledger, while a different call under a reused key
    /// gets an id of its own.
    fn transaction_id(
        &self,
        body: &TransactionBody,
        idempotency_key: Option<&str>,
    ) -> Result<TransactionId, DispatchError> {
        let payer = *self.signer.account_id();
        let nonce = match idempotency_key {
            Some(key) => {
                let content = body
                    .encode(&TransactionId::new(payer, 0))
                    .map_err(DispatchError::Signing)?;
                let mut hasher = blake3::Hasher::new();
                hasher.update(key.as_bytes()).update(&content);
                bytes_to_u64(hasher.finalize().as_bytes()).map_err(DispatchError::Signing)?
            }
            None => rand::random::<u64>(),
        };
        Ok(TransactionId::new(payer, nonce))
    }

    async fn submit_and_confirm(
        &self,
        body: TransactionBody,
        idempotency_key: Option<&str>,
    ) -> Result<Receipt, DispatchError> {
        let function = body.function_name().to_string();
        let transaction_id = self.transaction_id(&body, idempotency_key)?;
        let transaction = SignedTransaction::sign(transaction_id, &body, self.signer.as_ref())
            .map_err(DispatchError::Signing)
            .inspect_err(|e| error!(function = %function, error = %e, "Signing failed"))?;

        debug!(
            function = %function,
            transaction_id = %transaction_id,
            gas = body.gas(),
            "Submitting transaction"
        );

        let mut resubmissions = 0;
        loop {
            match self.submit_with_retry(&transaction, &function).await? {
                Submission::Acknowledged(ack)
                    if ack.precheck_status != status::SUCCESS
                        && ack.precheck_status != status::DUPLICATE_TRANSACTION =>
                {
                    let reason = failure_from_status(ack.precheck_status, &ack.message);
                    warn!(function = %function, transaction_id = %transaction_id, reason = %reason, "Precheck rejected transaction");
                    return Ok(Receipt {
                        transaction_id,
                        status: ReceiptStatus::Failure(reason),
                        resource_id: None,
                        gas_used: 0,
                    });
                }
                Submission::Acknowledged(_) | Submission::Unconfirmed => {}
            }

            if let Some(record) = self.await_record(&transaction_id, &function).await {
                return Ok(receipt_from_record(&record));
            }

            if idempotency_key.is_none() || resubmissions >= self.config.max_resubmissions {
                error!(
                    function = %function,
                    transaction_id = %transaction_id,
                    resubmissions,
                    "No record found, outcome unknown"
                );
                return Err(DispatchError::Ambiguous {
                    function,
                    transaction_id,
                });
            }

            resubmissions += 1;
            warn!(
                function = %function,
                transaction_id = %transaction_id,
                attempt = resubmissions,
                "Resubmitting idempotent transaction"
            );
        }
    }

    async fn submit_with_retry(
        &self,
        transaction: &SignedTransaction,
        function: &str,
    ) -> Result<Submission, DispatchError> {
        let max_attempts = self.config.max_transport_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let error = match timeout(self.config.call_timeout, self.network.submit(transaction)).await {
                Ok(Ok(ack)) => return Ok(Submission::Acknowledged(ack)),
                Err(_) => {
                    warn!(function, attempt, "Submission timed out, checking for a record");
                    return Ok(Submission::Unconfirmed);
                }
                Ok(Err(NetworkError::Interrupted(reason))) => {
                    warn!(function, attempt, reason = %reason, "Submission interrupted, checking for a record");
                    return Ok(Submission::Unconfirmed);
                }
                Ok(Err(error)) => error,
            };

            if !error.is_retryable() || attempt >= max_attempts {
                error!(function, attempt, error = %error, "Submission failed");
                return Err(DispatchError::Transport {
                    function: function.to_string(),
                    attempts: attempt,
                    source: error,
                });
            }

            warn!(function, attempt, error = %error, "Ledger unreachable, retrying");
            sleep(self.config.transport_backoff * attempt).await;
        }
    }

    /// Polls until the receipt deadline, then makes the extra lookups.
    async fn await_record(
        &self,
        transaction_id: &TransactionId,
        function: &str,
    ) -> Option<TransactionRecord> {
        let deadline = Instant::now() + self.config.receipt_timeout;
        loop {
            if let Some(record) = self.lookup_record(transaction_id, function).await {
                return Some(record);
            }
            if Instant::now() + self.config.poll_interval > deadline {
                break;
            }
            sleep(self.config.poll_interval).await;
        }

        for attempt in 1..=self.config.requery_attempts {
            sleep(self.config.requery_backoff).await;
            debug!(function, transaction_id = %transaction_id, attempt, "Re-querying record");
            if let Some(record) = self.lookup_record(transaction_id, function).await {
                return Some(record);
            }
        }

        None
    }

    async fn lookup_record(
        &self,
        transaction_id: &TransactionId,
        function: &str,
    ) -> Option<TransactionRecord> {
        match timeout(
            self.config.call_timeout,
            self.network.transaction_record(transaction_id),
        )
        .await
        {
            Ok(Ok(record)) => record,
            Ok(Err(error)) => {
                debug!(function, transaction_id = %transaction_id, error = %error, "Record lookup failed");
                None
            }
            Err(_) => {
                debug!(function, transaction_id = %transaction_id, "Record lookup timed out");
                None
            }
        }
    }

    /// Queries change nothing, so interrupted ones are retried too.
    async fn query_with_retry(&self, query: &ContractQuery) -> Result<QueryOutcome, DispatchError> {
        let function = query.function.as_str();
        let max_attempts = self.config.max_transport_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let error = match timeout(self.config.call_timeout, self.network.call_query(query)).await {
                Ok(Ok(outcome)) => return Ok(outcome),
                Ok(Err(error)) => error,
                Err(_) => NetworkError::Interrupted(format!(
                    "no answer within {:?}",
                    self.config.call_timeout
                )),
            };

            if matches!(error, NetworkError::Protocol(_)) || attempt >= max_attempts {
                error!(function, attempt, error = %error, "Query failed");
                return Err(DispatchError::Transport {
                    function: function.to_string(),
                    attempts: attempt,
                    source: error,
                });
            }

            warn!(function, attempt, error = %error, "Query failed, retrying");
            sleep(self.config.transport_backoff * attempt).await;
        }
    }
}
