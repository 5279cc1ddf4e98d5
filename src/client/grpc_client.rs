use anyhow::{Context, Result};
use tonic::{
    Code, Request, Status,
    client::Grpc,
    codec::ProstCodec,
    codegen::http::uri::PathAndQuery,
    transport::{Channel, Endpoint},
};
use tracing::debug;

use crate::{
    config::OperatorConfig,
    error::NetworkError,
    types::{
        ContractQuery, QueryOutcome, SignedTransaction, SubmitAck, TransactionId, TransactionRecord,
    },
};

use super::{
    LedgerNetwork,
    proto::{
        CALL_CONTRACT_PATH, CallContractRequest, CallContractResponse,
        GET_TRANSACTION_RECORD_PATH, GetTransactionRecordRequest, GetTransactionRecordResponse,
        SUBMIT_TRANSACTION_PATH, SubmitTransactionRequest, SubmitTransactionResponse,
    },
};

/// gRPC transport to a ledger node.
#[derive(Debug, Clone)]
pub struct LedgerGrpcClient {
    channel: Channel,
    pub grpc_url: String,
}

impl LedgerGrpcClient {
    pub async fn new(grpc_url: String) -> Result<Self> {
        let channel = Endpoint::from_shared(grpc_url.clone())
            .with_context(|| format!("Invalid gRPC url '{}'", grpc_url))?
            .connect()
            .await
            .with_context(|| format!("Failed to connect to {}", grpc_url))?;

        debug!(grpc_url = %grpc_url, "Connected to ledger node");

        Ok(Self { channel, grpc_url })
    }

    pub async fn from_config(config: &OperatorConfig) -> Result<Self> {
        Self::new(config.grpc_url.clone()).await
    }

    async fn unary<Req, Resp>(&self, path: &'static str, message: Req) -> Result<Resp, Status>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let mut grpc = Grpc::new(self.channel.clone());
        grpc.ready().await.map_err(|e| {
            Status::unavailable(format!("{} is not ready: {}", self.grpc_url, e))
        })?;

        let codec = ProstCodec::<Req, Resp>::default();
        let response = grpc
            .unary(Request::new(message), PathAndQuery::from_static(path), codec)
            .await?;

        Ok(response.into_inner())
    }
}

/// Classifies a gRPC failure by whether the request may have been processed.
pub fn network_error_from_status(status: Status) -> NetworkError {
    let message = format!("{:?}: {}", status.code(), status.message());
    match status.code() {
        Code::Unavailable => NetworkError::Unreachable(message),
        Code::DeadlineExceeded | Code::Cancelled | Code::Unknown | Code::Internal => {
            NetworkError::Interrupted(message)
        }
        _ => NetworkError::Protocol(message),
    }
}

impl LedgerNetwork for LedgerGrpcClient {
    async fn submit(&self, transaction: &SignedTransaction) -> Result<SubmitAck, NetworkError> {
        let response: SubmitTransactionResponse = self
            .unary(
                SUBMIT_TRANSACTION_PATH,
                SubmitTransactionRequest::from(transaction),
            )
            .await
            .map_err(network_error_from_status)?;

        Ok(response.into_ack(transaction.transaction_id))
    }

    async fn transaction_record(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<TransactionRecord>, NetworkError> {
        let request = GetTransactionRecordRequest {
            transaction_id: Some(transaction_id.into()),
        };

        let response: GetTransactionRecordResponse =
            match self.unary(GET_TRANSACTION_RECORD_PATH, request).await {
                Ok(response) => response,
                Err(status) if status.code() == Code::NotFound => return Ok(None),
                Err(status) => return Err(network_error_from_status(status)),
            };

        response
            .record
            .map(TransactionRecord::try_from)
            .transpose()
            .map_err(|e| NetworkError::Protocol(format!("{e:#}")))
    }

    async fn call_query(&self, query: &ContractQuery) -> Result<QueryOutcome, NetworkError> {
        let response: CallContractResponse = self
            .unary(CALL_CONTRACT_PATH, CallContractRequest::from(query))
            .await
            .map_err(network_error_from_status)?;

        Ok(response.into())
    }
}
