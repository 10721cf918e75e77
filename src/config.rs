//! Service configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment
//! variables (or a `.env` file via `dotenvy`). The contract address and
//! signing credential have no defaults; their absence is startup-fatal.

use std::net::SocketAddr;

use crate::error::ConfigError;

/// What to do when the event transport redelivers a request id that was
/// already dispatched in this process.
///
/// The contract's own already-fulfilled guard remains the final
/// authority either way; `Suppress` only avoids burning gas on
/// duplicates the process has already seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeliveryPolicy {
    /// Run the pipeline again for every delivery (default; matches the
    /// behavior of the contract-side guard being the sole dedup).
    Process,
    /// Drop deliveries whose request id was already dispatched by this
    /// process instance.
    Suppress,
}

/// Top-level service configuration.
///
/// Loaded once at startup via [`OracleConfig::from_env`].
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// HTTP JSON-RPC endpoint used for transaction submission.
    pub rpc_url: String,

    /// WebSocket endpoint used for the event subscription.
    pub ws_url: String,

    /// Address of the analysis market contract.
    pub contract_address: String,

    /// Private key of the contract owner; the submission entry point is
    /// owner-only.
    pub owner_private_key: String,

    /// Socket address to bind the health endpoint to.
    pub listen_addr: SocketAddr,

    /// Base URL of the market data API.
    pub market_data_url: String,

    /// Optional pro-tier API key for the market data source.
    pub market_data_api_key: Option<String>,

    /// Base URL of the storage gateway.
    pub storage_url: String,

    /// Timeout in seconds applied to each fetch/generate/store call.
    pub call_timeout_secs: u64,

    /// Seconds to await transaction inclusion before giving up.
    pub confirmation_timeout_secs: u64,

    /// Seconds to let in-flight requests drain on shutdown.
    pub shutdown_grace_secs: u64,

    /// Redelivery handling policy.
    pub redelivery_policy: RedeliveryPolicy,

    /// Capacity of the listener → orchestrator request channel.
    pub request_channel_capacity: usize,
}

impl OracleConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file,
    /// then falls back to defaults for everything except the contract
    /// address and signing credential.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] if `CONTRACT_ADDRESS` or
    /// `OWNER_PRIVATE_KEY` is unset, and [`ConfigError::InvalidVar`] if
    /// `LISTEN_ADDR` or `REDELIVERY_POLICY` cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let contract_address =
            std::env::var("CONTRACT_ADDRESS").map_err(|_| ConfigError::MissingVar("CONTRACT_ADDRESS"))?;
        let owner_private_key =
            std::env::var("OWNER_PRIVATE_KEY").map_err(|_| ConfigError::MissingVar("OWNER_PRIVATE_KEY"))?;

        let rpc_url = std::env::var("RPC_URL")
            .unwrap_or_else(|_| "https://evmrpc-testnet.0g.ai".to_string());
        let ws_url =
            std::env::var("WS_URL").unwrap_or_else(|_| "wss://evmrpc-testnet.0g.ai".to_string());

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3001".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidVar {
                key: "LISTEN_ADDR",
                message: format!("{e}"),
            })?;

        let market_data_url = std::env::var("MARKET_DATA_URL")
            .unwrap_or_else(|_| "https://api.coingecko.com/api/v3".to_string());
        let market_data_api_key = std::env::var("MARKET_DATA_API_KEY").ok();

        let storage_url =
            std::env::var("STORAGE_URL").unwrap_or_else(|_| "http://127.0.0.1:5678".to_string());

        let redelivery_policy = parse_redelivery_policy("REDELIVERY_POLICY")?;

        Ok(Self {
            rpc_url,
            ws_url,
            contract_address,
            owner_private_key,
            listen_addr,
            market_data_url,
            market_data_api_key,
            storage_url,
            call_timeout_secs: parse_env("CALL_TIMEOUT_SECS", 30),
            confirmation_timeout_secs: parse_env("CONFIRMATION_TIMEOUT_SECS", 120),
            shutdown_grace_secs: parse_env("SHUTDOWN_GRACE_SECS", 30),
            redelivery_policy,
            request_channel_capacity: parse_env("REQUEST_CHANNEL_CAPACITY", 256),
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on
/// missing or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses the redelivery policy variable. Missing means `Process`;
/// anything other than `process`/`suppress` is a configuration error
/// rather than a silent fallback, since the two behaviors differ in
/// gas spend.
fn parse_redelivery_policy(key: &'static str) -> Result<RedeliveryPolicy, ConfigError> {
    policy_from_value(key, std::env::var(key).ok().as_deref())
}

fn policy_from_value(
    key: &'static str,
    value: Option<&str>,
) -> Result<RedeliveryPolicy, ConfigError> {
    match value {
        None => Ok(RedeliveryPolicy::Process),
        Some(v) if v.eq_ignore_ascii_case("process") => Ok(RedeliveryPolicy::Process),
        Some(v) if v.eq_ignore_ascii_case("suppress") => Ok(RedeliveryPolicy::Suppress),
        Some(other) => Err(ConfigError::InvalidVar {
            key,
            message: format!("expected 'process' or 'suppress', got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_falls_back_on_missing() {
        assert_eq!(parse_env("ALPHASENSE_TEST_UNSET_U64", 42_u64), 42);
    }

    #[test]
    fn redelivery_policy_defaults_to_process() {
        let policy = policy_from_value("REDELIVERY_POLICY", None);
        assert!(matches!(policy, Ok(RedeliveryPolicy::Process)));
    }

    #[test]
    fn redelivery_policy_is_case_insensitive() {
        let policy = policy_from_value("REDELIVERY_POLICY", Some("SUPPRESS"));
        assert!(matches!(policy, Ok(RedeliveryPolicy::Suppress)));
    }

    #[test]
    fn redelivery_policy_rejects_unknown_values() {
        let result = policy_from_value("REDELIVERY_POLICY", Some("sometimes"));
        assert!(result.is_err());
    }
}
