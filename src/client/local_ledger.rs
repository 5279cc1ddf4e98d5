//! In-process ledger.
//!
//! Verifies signatures, meters gas and keeps one record per transaction id,
//! which is enough to exercise the dispatcher end to end. Contracts are plain
//! Rust objects registered under the blake3 hash of their bytecode. Every
//! call runs on a copy of the contract state that is kept only on success.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    basic_elements::{
        args::Args,
        keys::{PublicKey, Signature},
    },
    constants::{BASE_CALL_GAS, BASE_DEPLOY_GAS},
    error::NetworkError,
    helpers::records::{status, status_of},
    types::{
        AccountId, ContractHandle, ContractQuery, EntityId, FailureReason, QueryOutcome,
        SignedTransaction, SubmitAck, TransactionBody, TransactionId, TransactionRecord,
    },
};

use super::LedgerNetwork;

const FIRST_ENTITY_NUM: u64 = 1001;

/// Why a contract call stopped without effect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Revert {
    #[error("out of gas")]
    OutOfGas,

    #[error("caller is not authorized")]
    Unauthorized,

    #[error("{0}")]
    Reason(String),
}

impl Revert {
    pub fn reason(message: impl Into<String>) -> Self {
        Revert::Reason(message.into())
    }
}

impl From<anyhow::Error> for Revert {
    fn from(error: anyhow::Error) -> Self {
        Revert::Reason(format!("invalid arguments: {error:#}"))
    }
}

impl From<Revert> for FailureReason {
    fn from(revert: Revert) -> Self {
        match revert {
            Revert::OutOfGas => FailureReason::InsufficientGas,
            Revert::Unauthorized => FailureReason::Unauthorized,
            Revert::Reason(message) => FailureReason::Reverted(message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasMeter {
    limit: u64,
    used: u64,
}

impl GasMeter {
    pub fn new(limit: u64) -> Self {
        Self { limit, used: 0 }
    }

    pub fn charge(&mut self, amount: u64) -> Result<(), Revert> {
        let used = self.used.saturating_add(amount);
        if used > self.limit {
            self.used = self.limit;
            return Err(Revert::OutOfGas);
        }
        self.used = used;
        Ok(())
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    pub fn remaining(&self) -> u64 {
        self.limit - self.used
    }
}

/// What a contract sees about the current call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: AccountId,
    /// Account that deployed the contract.
    pub owner: AccountId,
    pub contract: ContractHandle,
}

impl CallContext {
    pub fn require_owner(&self) -> Result<(), Revert> {
        if self.caller != self.owner {
            return Err(Revert::Unauthorized);
        }
        Ok(())
    }
}

/// Contract state plus its entry points.
pub trait ContractLogic: Send {
    /// Dispatches `function`. Returned [`Args`] hold the encoded return values.
    fn call(
        &mut self,
        context: &CallContext,
        function: &str,
        args: &mut Args,
        gas: &mut GasMeter,
    ) -> Result<Args, Revert>;

    fn box_clone(&self) -> Box<dyn ContractLogic>;
}

impl Clone for Box<dyn ContractLogic> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Builds a fresh contract from its constructor arguments.
pub type ContractFactory = Arc<
    dyn Fn(&CallContext, &mut Args, &mut GasMeter) -> Result<Box<dyn ContractLogic>, Revert>
        + Send
        + Sync,
>;

struct DeployedContract {
    owner: AccountId,
    logic: Box<dyn ContractLogic>,
}

#[derive(Default)]
struct Faults {
    unreachable_submissions: u32,
    interrupted_submissions: u32,
    unreachable_queries: u32,
    withheld_record_lookups: u32,
}

#[derive(Default)]
struct State {
    next_entity_num: u64,
    accounts: HashMap<AccountId, PublicKey>,
    factories: HashMap<[u8; 32], ContractFactory>,
    contracts: HashMap<ContractHandle, DeployedContract>,
    records: HashMap<TransactionId, TransactionRecord>,
    consensus_sequence: u64,
    submissions: u64,
    faults: Faults,
}

impl State {
    fn allocate_entity(&mut self) -> EntityId {
        let id = EntityId::new(0, 0, self.next_entity_num);
        self.next_entity_num += 1;
        id
    }
}

#[derive(Clone)]
pub struct LocalLedger {
    state: Arc<Mutex<State>>,
}

impl fmt::Debug for LocalLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("LocalLedger")
            .field("accounts", &state.accounts.len())
            .field("contracts", &state.contracts.len())
            .field("records", &state.records.len())
            .finish()
    }
}

impl Default for LocalLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalLedger {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                next_entity_num: FIRST_ENTITY_NUM,
                ..State::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Opens an account controlled by `public_key`.
    pub fn create_account(&self, public_key: &PublicKey) -> AccountId {
        let mut state = self.lock();
        let account = AccountId::from(state.allocate_entity());
        state.accounts.insert(account, *public_key);
        debug!(account = %account, "Created account");
        account
    }

    /// Makes `bytecode` deployable; deployments run `factory` as constructor.
    pub fn register_bytecode(&self, bytecode: &[u8], factory: ContractFactory) {
        let hash = *blake3::hash(bytecode).as_bytes();
        self.lock().factories.insert(hash, factory);
    }

    /// The next `count` submissions fail before reaching the ledger.
    pub fn fail_next_submissions(&self, count: u32) {
        self.lock().faults.unreachable_submissions = count;
    }

    /// The next `count` submissions are applied but the response is lost.
    pub fn interrupt_next_submissions(&self, count: u32) {
        self.lock().faults.interrupted_submissions = count;
    }

    pub fn fail_next_queries(&self, count: u32) {
        self.lock().faults.unreachable_queries = count;
    }

    /// The next `count` record lookups report nothing, as if consensus lagged.
    pub fn withhold_next_record_lookups(&self, count: u32) {
        self.lock().faults.withheld_record_lookups = count;
    }

    /// Submissions that reached the ledger, duplicates included.
    pub fn submission_count(&self) -> u64 {
        self.lock().submissions
    }

    pub fn record(&self, transaction_id: &TransactionId) -> Option<TransactionRecord> {
        self.lock().records.get(transaction_id).cloned()
    }

    pub fn contract_count(&self) -> usize {
        self.lock().contracts.len()
    }

    fn precheck(state: &State, transaction: &SignedTransaction) -> Result<TransactionBody, (i32, String)> {
        let (transaction_id, body) = TransactionBody::decode(&transaction.body_bytes)
            .map_err(|e| (status::INVALID_TRANSACTION_BODY, format!("{e:#}")))?;

        if transaction_id != transaction.transaction_id {
            return Err((
                status::INVALID_TRANSACTION_BODY,
                "transaction id does not match the signed body".to_string(),
            ));
        }

        let Some(account_key) = state.accounts.get(&transaction_id.payer) else {
            return Err((
                status::INVALID_SIGNATURE,
                format!("unknown payer {}", transaction_id.payer),
            ));
        };

        let signed_by_payer = PublicKey::from_bytes(&transaction.public_key)
            .ok()
            .filter(|key| key == account_key)
            .zip(Signature::from_bytes(transaction.signature.clone()).ok())
            .is_some_and(|(key, signature)| key.verify(&transaction.body_bytes, &signature));

        if !signed_by_payer {
            return Err((
                status::INVALID_SIGNATURE,
                format!("signature does not match payer {}", transaction_id.payer),
            ));
        }

        Ok(body)
    }

    fn apply(state: &mut State, transaction_id: TransactionId, body: TransactionBody) -> TransactionRecord {
        let mut gas = GasMeter::new(body.gas());
        let outcome = match body {
            TransactionBody::ContractCall {
                contract,
                function,
                parameters,
                ..
            } => Self::apply_call(state, transaction_id.payer, contract, &function, parameters, &mut gas)
                .map(|_| None),
            TransactionBody::ContractCreate {
                bytecode,
                constructor_parameters,
                ..
            } => Self::apply_create(
                state,
                transaction_id.payer,
                &bytecode,
                constructor_parameters,
                &mut gas,
            )
            .map(Some),
        };

        state.consensus_sequence += 1;
        let (status, error_message, created_entity) = match outcome {
            Ok(created) => (status::SUCCESS, String::new(), created),
            Err(reason) => {
                let message = match &reason {
                    FailureReason::Reverted(message) | FailureReason::InvalidTransaction(message) => {
                        message.clone()
                    }
                    other => other.to_string(),
                };
                (status_of(&reason), message, None)
            }
        };

        TransactionRecord {
            transaction_id,
            status,
            error_message,
            created_entity,
            gas_used: gas.used(),
            consensus_sequence: state.consensus_sequence,
        }
    }

    fn apply_call(
        state: &mut State,
        caller: AccountId,
        contract: ContractHandle,
        function: &str,
        parameters: Vec<u8>,
        gas: &mut GasMeter,
    ) -> Result<(), FailureReason> {
        let deployed = state
            .contracts
            .get_mut(&contract)
            .ok_or(FailureReason::ContractNotFound)?;
        gas.charge(BASE_CALL_GAS)?;

        let context = CallContext {
            caller,
            owner: deployed.owner,
            contract,
        };
        let mut working_copy = deployed.logic.box_clone();
        working_copy.call(&context, function, &mut Args::from_bytes(parameters), gas)?;
        deployed.logic = working_copy;
        Ok(())
    }

    fn apply_create(
        state: &mut State,
        deployer: AccountId,
        bytecode: &[u8],
        constructor_parameters: Vec<u8>,
        gas: &mut GasMeter,
    ) -> Result<EntityId, FailureReason> {
        gas.charge(BASE_DEPLOY_GAS)?;
        let hash = *blake3::hash(bytecode).as_bytes();
        let factory = state.factories.get(&hash).cloned().ok_or_else(|| {
            FailureReason::InvalidTransaction("bytecode is not a known contract".to_string())
        })?;

        let entity = EntityId::new(0, 0, state.next_entity_num);
        let context = CallContext {
            caller: deployer,
            owner: deployer,
            contract: ContractHandle::from(entity),
        };
        let logic = factory(&context, &mut Args::from_bytes(constructor_parameters), gas)?;

        let entity = state.allocate_entity();
        state.contracts.insert(
            ContractHandle::from(entity),
            DeployedContract {
                owner: deployer,
                logic,
            },
        );
        Ok(entity)
    }
}

impl LedgerNetwork for LocalLedger {
    async fn submit(&self, transaction: &SignedTransaction) -> Result<SubmitAck, NetworkError> {
        let mut state = self.lock();

        if state.faults.unreachable_submissions > 0 {
            state.faults.unreachable_submissions -= 1;
            return Err(NetworkError::Unreachable("local ledger refused connection".to_string()));
        }

        state.submissions += 1;
        let transaction_id = transaction.transaction_id;

        let ack = |precheck_status: i32, message: String| SubmitAck {
            transaction_id,
            precheck_status,
            message,
        };

        if state.records.contains_key(&transaction_id) {
            debug!(transaction_id = %transaction_id, "Duplicate submission");
            return Ok(ack(status::DUPLICATE_TRANSACTION, "already processed".to_string()));
        }

        let body = match Self::precheck(&state, transaction) {
            Ok(body) => body,
            Err((code, message)) => {
                warn!(transaction_id = %transaction_id, code, message = %message, "Precheck failed");
                return Ok(ack(code, message));
            }
        };

        let record = Self::apply(&mut state, transaction_id, body);
        debug!(
            transaction_id = %transaction_id,
            status = record.status,
            gas_used = record.gas_used,
            "Applied transaction"
        );
        state.records.insert(transaction_id, record);

        if state.faults.interrupted_submissions > 0 {
            state.faults.interrupted_submissions -= 1;
            return Err(NetworkError::Interrupted("connection reset after send".to_string()));
        }

        Ok(ack(status::SUCCESS, String::new()))
    }

    async fn transaction_record(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<TransactionRecord>, NetworkError> {
        let mut state = self.lock();
        if state.faults.withheld_record_lookups > 0 {
            state.faults.withheld_record_lookups -= 1;
            return Ok(None);
        }
        Ok(state.records.get(transaction_id).cloned())
    }

    async fn call_query(&self, query: &ContractQuery) -> Result<QueryOutcome, NetworkError> {
        let mut state = self.lock();

        if state.faults.unreachable_queries > 0 {
            state.faults.unreachable_queries -= 1;
            return Err(NetworkError::Unreachable("local ledger refused connection".to_string()));
        }

        let Some(deployed) = state.contracts.get(&query.contract) else {
            return Ok(QueryOutcome {
                status: status::INVALID_CONTRACT_ID,
                result: Vec::new(),
                error_message: format!("no contract {}", query.contract),
                gas_used: 0,
            });
        };

        let context = CallContext {
            caller: query.sender,
            owner: deployed.owner,
            contract: query.contract,
        };
        let mut gas = GasMeter::new(query.gas);
        // Queries run on a throwaway copy.
        let mut scratch = deployed.logic.box_clone();
        let outcome = gas.charge(BASE_CALL_GAS).and_then(|()| {
            scratch.call(
                &context,
                &query.function,
                &mut Args::from_bytes(query.parameters.clone()),
                &mut gas,
            )
        });

        Ok(match outcome {
            Ok(result) => QueryOutcome {
                status: status::SUCCESS,
                result: result.into_bytes(),
                error_message: String::new(),
                gas_used: gas.used(),
            },
            Err(revert) => {
                let reason = FailureReason::from(revert);
                QueryOutcome {
                    status: status_of(&reason),
                    result: Vec::new(),
                    error_message: match reason {
                        FailureReason::Reverted(message) => message,
                        other => other.to_string(),
                    },
                    gas_used: gas.used(),
                }
            }
        })
    }
}
