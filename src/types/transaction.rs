use anyhow::{Context, Result, bail};

use crate::{
    basic_elements::args::Args,
    crypto::traits::signer::TransactionSigner,
};

use super::{AccountId, ContractHandle, TransactionId};

const CONTRACT_CALL_KIND: u8 = 1;
const CONTRACT_CREATE_KIND: u8 = 2;

/// Function name reported for deployments in logs and errors.
pub const CONTRACT_CREATE_FUNCTION: &str = "<contract create>";

/// Body of a state-changing transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionBody {
    ContractCall {
        contract: ContractHandle,
        function: String,
        parameters: Vec<u8>,
        gas: u64,
    },
    ContractCreate {
        bytecode: Vec<u8>,
        constructor_parameters: Vec<u8>,
        gas: u64,
    },
}

impl TransactionBody {
    pub fn gas(&self) -> u64 {
        match self {
            TransactionBody::ContractCall { gas, .. } | TransactionBody::ContractCreate { gas, .. } => {
                *gas
            }
        }
    }

    pub fn function_name(&self) -> &str {
        match self {
            TransactionBody::ContractCall { function, .. } => function,
            TransactionBody::ContractCreate { .. } => CONTRACT_CREATE_FUNCTION,
        }
    }

    /// Encodes the id and the body; these are the bytes a signer signs.
    pub fn encode(&self, transaction_id: &TransactionId) -> Result<Vec<u8>> {
        let mut args = Args::new();
        args.add_serializable(transaction_id);

        match self {
            TransactionBody::ContractCall {
                contract,
                function,
                parameters,
                gas,
            } => {
                args.add_u8(CONTRACT_CALL_KIND)
                    .add_serializable(contract)
                    .add_string(function)?
                    .add_bytes(parameters)?
                    .add_u64(*gas);
            }
            TransactionBody::ContractCreate {
                bytecode,
                constructor_parameters,
                gas,
            } => {
                args.add_u8(CONTRACT_CREATE_KIND)
                    .add_bytes(bytecode)?
                    .add_bytes(constructor_parameters)?
                    .add_u64(*gas);
            }
        }

        Ok(args.into_bytes())
    }

    pub fn decode(bytes: &[u8]) -> Result<(TransactionId, TransactionBody)> {
        let mut args = Args::from_bytes(bytes.to_vec());
        let transaction_id = args
            .next_serializable::<TransactionId>()
            .context("Failed to read transaction id")?;

        let body = match args.next_u8().context("Failed to read transaction kind")? {
            CONTRACT_CALL_KIND => TransactionBody::ContractCall {
                contract: args.next_serializable::<ContractHandle>()?,
                function: args.next_string().context("Failed to read function name")?,
                parameters: args.next_bytes().context("Failed to read parameters")?,
                gas: args.next_u64().context("Failed to read gas")?,
            },
            CONTRACT_CREATE_KIND => TransactionBody::ContractCreate {
                bytecode: args.next_bytes().context("Failed to read bytecode")?,
                constructor_parameters: args
                    .next_bytes()
                    .context("Failed to read constructor parameters")?,
                gas: args.next_u64().context("Failed to read gas")?,
            },
            other => bail!("Unknown transaction kind {}", other),
        };

        if args.remaining() != 0 {
            bail!(
                "Transaction body has {} trailing bytes",
                args.remaining()
            );
        }

        Ok((transaction_id, body))
    }
}

/// Transaction bytes together with the signer's public key and signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub transaction_id: TransactionId,
    pub body_bytes: Vec<u8>,
    pub public_key: Vec<u8>,
    pub signature: Vec<u8>,
}

impl SignedTransaction {
    pub fn sign(
        transaction_id: TransactionId,
        body: &TransactionBody,
        signer: &dyn TransactionSigner,
    ) -> Result<Self> {
        let body_bytes = body.encode(&transaction_id)?;
        let signature = signer
            .sign(&body_bytes)
            .with_context(|| format!("Failed to sign transaction {}", transaction_id))?;

        Ok(Self {
            transaction_id,
            body_bytes,
            public_key: signer.public_key().to_bytes(),
            signature: signature.to_vec(),
        })
    }
}

/// Node response to a submission, before consensus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAck {
    pub transaction_id: TransactionId,
    pub precheck_status: i32,
    pub message: String,
}

/// Read-only call executed by a single node against current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractQuery {
    pub contract: ContractHandle,
    pub function: String,
    pub parameters: Vec<u8>,
    pub gas: u64,
    pub sender: AccountId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    pub status: i32,
    pub result: Vec<u8>,
    pub error_message: String,
    pub gas_used: u64,
}
