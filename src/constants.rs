use std::time::Duration;

pub const GAS_READ: u64 = 100_000;
pub const GAS_UPDATE: u64 = 150_000;
pub const GAS_REGISTER: u64 = 200_000;
pub const GAS_LARGE_WRITE: u64 = 250_000;
pub const GAS_DEPLOYMENT: u64 = 1_500_000;

// Charged by the local ledger before any contract code runs.
pub const BASE_CALL_GAS: u64 = 21_000;
pub const BASE_DEPLOY_GAS: u64 = 500_000;

pub const ENV_ACCOUNT_ID: &str = "MY_ACCOUNT_ID";
pub const ENV_PRIVATE_KEY: &str = "MY_PRIVATE_KEY";
pub const ENV_NETWORK: &str = "LEDGER_NETWORK";
pub const ENV_GRPC_URL: &str = "LEDGER_GRPC_URL";
pub const ENV_CALL_TIMEOUT_MS: &str = "LEDGER_CALL_TIMEOUT_MS";
pub const ENV_RECEIPT_TIMEOUT_MS: &str = "LEDGER_RECEIPT_TIMEOUT_MS";
pub const ENV_POLL_INTERVAL_MS: &str = "LEDGER_POLL_INTERVAL_MS";
pub const ENV_MAX_TRANSPORT_ATTEMPTS: &str = "LEDGER_MAX_TRANSPORT_ATTEMPTS";

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_TRANSPORT_ATTEMPTS: u32 = 3;
pub const DEFAULT_TRANSPORT_BACKOFF: Duration = Duration::from_millis(250);
pub const DEFAULT_REQUERY_ATTEMPTS: u32 = 3;
pub const DEFAULT_REQUERY_BACKOFF: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_RESUBMISSIONS: u32 = 2;

// Node started by the local tooling. Other networks are reached through LEDGER_GRPC_URL.
pub const LOCAL_GRPC_URL: &str = "http://127.0.0.1:50211";
