//! # ledger-script
//!
//! Deploys and calls the institution contracts from the command line.
//!
//! Subcommands:
//! - `ledger-script deploy` deploys a contract from a bytecode file
//! - `ledger-script call` executes or queries one function of a deployed contract

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rust_ledger_dispatch::{
    basic_elements::typed_value::TypedValue,
    client::{dispatcher::Dispatcher, grpc_client::LedgerGrpcClient},
    config::{DispatcherConfig, OperatorConfig},
    constants::GAS_DEPLOYMENT,
    entities::{ContractKind, descriptor_by_name},
    types::{CallKind, ContractHandle, ValueTag},
};
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ledger-script", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a new contract instance.
    Deploy {
        /// Contract kind (steg, sonede, internet, hopital, cnam, university, oou, delivery, person).
        #[arg(long)]
        contract: ContractKind,

        /// File holding the compiled contract.
        #[arg(long)]
        bytecode: PathBuf,

        /// Constructor argument as `tag:value`, e.g. `string:0.0.1001`. Repeatable.
        #[arg(long = "arg")]
        args: Vec<String>,

        #[arg(long, default_value_t = GAS_DEPLOYMENT)]
        gas: u64,
    },

    /// Execute or query a function of a deployed contract.
    Call {
        #[arg(long)]
        contract: ContractKind,

        /// Deployed contract id (`shard.realm.num`).
        #[arg(long)]
        contract_id: ContractHandle,

        #[arg(long)]
        function: String,

        /// Function argument as `tag:value`, e.g. `uint256:42`. Repeatable.
        #[arg(long = "arg")]
        args: Vec<String>,

        /// Gas limit override.
        #[arg(long)]
        gas: Option<u64>,

        /// Makes a lost execution safe to resubmit.
        #[arg(long)]
        idempotency_key: Option<String>,
    },
}

fn parse_arg(raw: &str) -> Result<TypedValue> {
    let (tag, value) = raw
        .split_once(':')
        .with_context(|| format!("Argument '{}' is not in tag:value form", raw))?;
    let tag: ValueTag = tag.parse()?;
    TypedValue::parse(tag, value)
}

fn parse_args(raw: &[String]) -> Result<Vec<TypedValue>> {
    raw.iter().map(|arg| parse_arg(arg)).collect()
}

fn values_json(values: &[TypedValue]) -> serde_json::Value {
    values
        .iter()
        .map(|value| json!({ "type": value.tag().as_str(), "value": value.to_string() }))
        .collect()
}

async fn connect() -> Result<Dispatcher<LedgerGrpcClient>> {
    let operator = OperatorConfig::from_env()?;
    let config = DispatcherConfig::from_env()?;
    let signer = operator.signer()?;
    let client = LedgerGrpcClient::from_config(&operator).await?;
    info!(grpc_url = %client.grpc_url, account = %operator.account_id, "Operator ready");
    Ok(Dispatcher::new(client, signer, config))
}

async fn deploy(kind: ContractKind, bytecode: PathBuf, args: &[String], gas: u64) -> Result<()> {
    let params = parse_args(args)?;
    let tags: Vec<ValueTag> = params.iter().map(TypedValue::tag).collect();
    if tags != kind.constructor_params() {
        bail!(
            "{} constructor takes {:?}, got {:?}",
            kind,
            kind.constructor_params(),
            tags
        );
    }

    let dispatcher = connect().await?;
    let contract = dispatcher.deploy_from_file(&bytecode, &params, gas).await?;
    println!(
        "{}",
        json!({
            "contract": contract.to_string(),
            "solidity_address": contract.to_solidity_address()?,
        })
    );
    Ok(())
}

async fn call(
    kind: ContractKind,
    contract: ContractHandle,
    function: &str,
    args: &[String],
    gas: Option<u64>,
    idempotency_key: Option<String>,
) -> Result<()> {
    let mut descriptor = descriptor_by_name(kind, contract, function, parse_args(args)?)?;
    if let Some(gas) = gas {
        descriptor = descriptor.with_gas_limit(gas)?;
    }
    if let Some(key) = idempotency_key {
        descriptor = descriptor.with_idempotency_key(key);
    }

    let dispatcher = connect().await?;
    let output = match descriptor.kind() {
        CallKind::Execute => serde_json::to_value(dispatcher.execute(&descriptor).await?)?,
        CallKind::Query => {
            let result = dispatcher.query(&descriptor).await?;
            json!({ "function": function, "values": values_json(result.values()) })
        }
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_ledger_dispatch=info,ledger_script=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Deploy {
            contract,
            bytecode,
            args,
            gas,
        } => deploy(contract, bytecode, &args, gas).await,
        Commands::Call {
            contract,
            contract_id,
            function,
            args,
            gas,
            idempotency_key,
        } => call(contract, contract_id, &function, &args, gas, idempotency_key).await,
    };

    if let Err(e) = result {
        error!(error = %e, "Script failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
