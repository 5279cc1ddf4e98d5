use std::{fmt, str::FromStr, time::Duration};

use crate::{
    basic_elements::keys::PrivateKey,
    constants::{
        DEFAULT_CALL_TIMEOUT, DEFAULT_MAX_RESUBMISSIONS, DEFAULT_MAX_TRANSPORT_ATTEMPTS,
        DEFAULT_POLL_INTERVAL, DEFAULT_RECEIPT_TIMEOUT, DEFAULT_REQUERY_ATTEMPTS,
        DEFAULT_REQUERY_BACKOFF, DEFAULT_TRANSPORT_BACKOFF, ENV_ACCOUNT_ID, ENV_CALL_TIMEOUT_MS,
        ENV_GRPC_URL, ENV_MAX_TRANSPORT_ATTEMPTS, ENV_NETWORK, ENV_POLL_INTERVAL_MS,
        ENV_PRIVATE_KEY, ENV_RECEIPT_TIMEOUT_MS, LOCAL_GRPC_URL,
    },
    crypto::operator::OperatorSigner,
    error::ConfigError,
    types::AccountId,
};

/// Operator identity and ledger endpoint.
#[derive(Clone)]
pub struct OperatorConfig {
    pub account_id: AccountId,
    pub private_key: String,
    pub grpc_url: String,
}

impl fmt::Debug for OperatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorConfig")
            .field("account_id", &self.account_id)
            .field("private_key", &"<redacted>")
            .field("grpc_url", &self.grpc_url)
            .finish()
    }
}

impl OperatorConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let account_id = required(&lookup, ENV_ACCOUNT_ID)?;
        let account_id = account_id
            .parse::<AccountId>()
            .map_err(|e| invalid(ENV_ACCOUNT_ID, e))?;
        let private_key = required(&lookup, ENV_PRIVATE_KEY)?;

        let grpc_url = match lookup(ENV_GRPC_URL).filter(|url| !url.trim().is_empty()) {
            Some(url) => url,
            None => match lookup(ENV_NETWORK) {
                Some(network)
                    if matches!(network.trim().to_ascii_lowercase().as_str(), "local" | "localhost") =>
                {
                    LOCAL_GRPC_URL.to_string()
                }
                Some(network) => {
                    return Err(invalid(
                        ENV_NETWORK,
                        format!("no built-in endpoint for '{network}', set {ENV_GRPC_URL}"),
                    ));
                }
                None => return Err(ConfigError::Missing(ENV_GRPC_URL.to_string())),
            },
        };

        Ok(Self {
            account_id,
            private_key,
            grpc_url,
        })
    }

    pub fn signer(&self) -> Result<OperatorSigner, ConfigError> {
        let private_key = PrivateKey::parse(&self.private_key)
            .map_err(|e| invalid(ENV_PRIVATE_KEY, format!("{e:#}")))?;
        Ok(OperatorSigner::new(self.account_id, private_key))
    }
}

/// Retry, polling and deadline policy of the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Deadline applied to every single network call.
    pub call_timeout: Duration,
    /// How long to poll for a record after submission.
    pub receipt_timeout: Duration,
    pub poll_interval: Duration,
    pub max_transport_attempts: u32,
    pub transport_backoff: Duration,
    /// Extra record lookups once the receipt deadline has passed.
    pub requery_attempts: u32,
    pub requery_backoff: Duration,
    /// Resubmissions allowed for calls carrying an idempotency key.
    pub max_resubmissions: u32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            call_timeout: DEFAULT_CALL_TIMEOUT,
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_transport_attempts: DEFAULT_MAX_TRANSPORT_ATTEMPTS,
            transport_backoff: DEFAULT_TRANSPORT_BACKOFF,
            requery_attempts: DEFAULT_REQUERY_ATTEMPTS,
            requery_backoff: DEFAULT_REQUERY_BACKOFF,
            max_resubmissions: DEFAULT_MAX_RESUBMISSIONS,
        }
    }
}

impl DispatcherConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whichever timing variables are set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(ms) = optional::<u64>(&lookup, ENV_CALL_TIMEOUT_MS)? {
            config.call_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = optional::<u64>(&lookup, ENV_RECEIPT_TIMEOUT_MS)? {
            config.receipt_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = optional::<u64>(&lookup, ENV_POLL_INTERVAL_MS)? {
            if ms == 0 {
                return Err(invalid(ENV_POLL_INTERVAL_MS, "must be positive"));
            }
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(attempts) = optional::<u32>(&lookup, ENV_MAX_TRANSPORT_ATTEMPTS)? {
            if attempts == 0 {
                return Err(invalid(ENV_MAX_TRANSPORT_ATTEMPTS, "must be at least 1"));
            }
            config.max_transport_attempts = attempts;
        }

        Ok(config)
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String, ConfigError> {
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::Missing(name.to_string()))
}

fn optional<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| invalid(name, e)),
    }
}

fn invalid(var: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var: var.to_string(),
        reason: reason.to_string(),
    }
}
