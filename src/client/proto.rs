//! Messages of the `ledger.v1.LedgerService` gRPC service.

use anyhow::{Context, Result};

use crate::types::{
    AccountId, ContractHandle, ContractQuery, EntityId, QueryOutcome, SignedTransaction,
    SubmitAck, TransactionId, TransactionRecord,
};

pub const SUBMIT_TRANSACTION_PATH: &str = "/ledger.v1.LedgerService/SubmitTransaction";
pub const GET_TRANSACTION_RECORD_PATH: &str = "/ledger.v1.LedgerService/GetTransactionRecord";
pub const CALL_CONTRACT_PATH: &str = "/ledger.v1.LedgerService/CallContract";

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EntityIdMessage {
    #[prost(uint64, tag = "1")]
    pub shard: u64,
    #[prost(uint64, tag = "2")]
    pub realm: u64,
    #[prost(uint64, tag = "3")]
    pub num: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionIdMessage {
    #[prost(message, optional, tag = "1")]
    pub payer: Option<EntityIdMessage>,
    #[prost(uint64, tag = "2")]
    pub nonce: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubmitTransactionRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub body_bytes: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub public_key: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub signature: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubmitTransactionResponse {
    #[prost(int32, tag = "1")]
    pub precheck_status: i32,
    #[prost(string, tag = "2")]
    pub message: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetTransactionRecordRequest {
    #[prost(message, optional, tag = "1")]
    pub transaction_id: Option<TransactionIdMessage>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionRecordMessage {
    #[prost(message, optional, tag = "1")]
    pub transaction_id: Option<TransactionIdMessage>,
    #[prost(int32, tag = "2")]
    pub status: i32,
    #[prost(string, tag = "3")]
    pub error_message: String,
    #[prost(message, optional, tag = "4")]
    pub created_entity: Option<EntityIdMessage>,
    #[prost(uint64, tag = "5")]
    pub gas_used: u64,
    #[prost(uint64, tag = "6")]
    pub consensus_sequence: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetTransactionRecordResponse {
    #[prost(message, optional, tag = "1")]
    pub record: Option<TransactionRecordMessage>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CallContractRequest {
    #[prost(message, optional, tag = "1")]
    pub contract: Option<EntityIdMessage>,
    #[prost(string, tag = "2")]
    pub function: String,
    #[prost(bytes = "vec", tag = "3")]
    pub parameters: Vec<u8>,
    #[prost(uint64, tag = "4")]
    pub gas: u64,
    #[prost(message, optional, tag = "5")]
    pub sender: Option<EntityIdMessage>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CallContractResponse {
    #[prost(int32, tag = "1")]
    pub status: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub result: Vec<u8>,
    #[prost(string, tag = "3")]
    pub error_message: String,
    #[prost(uint64, tag = "4")]
    pub gas_used: u64,
}

impl From<EntityId> for EntityIdMessage {
    fn from(id: EntityId) -> Self {
        Self {
            shard: id.shard,
            realm: id.realm,
            num: id.num,
        }
    }
}

impl From<EntityIdMessage> for EntityId {
    fn from(message: EntityIdMessage) -> Self {
        EntityId::new(message.shard, message.realm, message.num)
    }
}

impl From<&TransactionId> for TransactionIdMessage {
    fn from(id: &TransactionId) -> Self {
        Self {
            payer: Some(id.payer.entity_id().into()),
            nonce: id.nonce,
        }
    }
}

impl TryFrom<TransactionIdMessage> for TransactionId {
    type Error = anyhow::Error;

    fn try_from(message: TransactionIdMessage) -> Result<Self> {
        let payer = message.payer.context("Transaction id without payer")?;
        Ok(TransactionId::new(
            AccountId::from(EntityId::from(payer)),
            message.nonce,
        ))
    }
}

impl From<&SignedTransaction> for SubmitTransactionRequest {
    fn from(transaction: &SignedTransaction) -> Self {
        Self {
            body_bytes: transaction.body_bytes.clone(),
            public_key: transaction.public_key.clone(),
            signature: transaction.signature.clone(),
        }
    }
}

impl SubmitTransactionResponse {
    pub fn into_ack(self, transaction_id: TransactionId) -> SubmitAck {
        SubmitAck {
            transaction_id,
            precheck_status: self.precheck_status,
            message: self.message,
        }
    }
}

impl TryFrom<TransactionRecordMessage> for TransactionRecord {
    type Error = anyhow::Error;

    fn try_from(message: TransactionRecordMessage) -> Result<Self> {
        let transaction_id = message
            .transaction_id
            .context("Record without transaction id")?
            .try_into()?;

        Ok(TransactionRecord {
            transaction_id,
            status: message.status,
            error_message: message.error_message,
            created_entity: message.created_entity.map(EntityId::from),
            gas_used: message.gas_used,
            consensus_sequence: message.consensus_sequence,
        })
    }
}

impl From<&ContractQuery> for CallContractRequest {
    fn from(query: &ContractQuery) -> Self {
        Self {
            contract: Some(query.contract.entity_id().into()),
            function: query.function.clone(),
            parameters: query.parameters.clone(),
            gas: query.gas,
            sender: Some(query.sender.entity_id().into()),
        }
    }
}

impl From<CallContractResponse> for QueryOutcome {
    fn from(response: CallContractResponse) -> Self {
        QueryOutcome {
            status: response.status,
            result: response.result,
            error_message: response.error_message,
            gas_used: response.gas_used,
        }
    }
}

impl CallContractRequest {
    pub fn contract_handle(&self) -> Option<ContractHandle> {
        self.contract.clone().map(|id| ContractHandle::from(EntityId::from(id)))
    }
}
