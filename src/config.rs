use anyhow::{Context, Result};

/// Process-wide configuration for the demo binary and any external-fetcher
/// wiring. The graph-reconstruction core itself (`transaction`, `graphspace`,
/// `serializer`) takes every knob it needs as a function argument instead of
/// reaching into this struct — only the binary and the external interfaces
/// (spec §6) read it.
#[derive(Debug, Clone)]
pub struct Config {
    pub graphspace: GraphspaceConfig,
    pub rpc: RpcConfig,
    pub logging: LoggingConfig,
}

/// Graphspace composition behavior (spec §4.9).
#[derive(Debug, Clone)]
pub struct GraphspaceConfig {
    /// Whether [`crate::graphspace::Graphspace::build`] should add the optional
    /// `NEW_TRANSACTION` linking edges. Off by default, matching the original.
    pub link_transactions: bool,
}

/// RPC endpoint used by the demo binary's [`crate::external::TransactionFetcher`]
/// implementation. The core crate never calls out to an RPC directly.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub url: String,
    pub commitment_level: String,
    pub timeout_seconds: u64,
}

/// Logging configuration consumed by `tracing_subscriber` at startup.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables, reading a `.env` file
    /// first if one is present.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let graphspace = GraphspaceConfig {
            link_transactions: get_bool_env("LINK_TRANSACTIONS", false),
        };

        let rpc = RpcConfig {
            url: get_env_or_default("RPC_URL", "https://api.mainnet-beta.solana.com"),
            commitment_level: get_env_or_default("COMMITMENT_LEVEL", "confirmed"),
            timeout_seconds: get_u64_env("RPC_TIMEOUT_SECONDS", 30)?,
        };

        let logging = LoggingConfig {
            log_level: get_env_or_default("LOG_LEVEL", "info"),
        };

        Ok(Config {
            graphspace,
            rpc,
            logging,
        })
    }
}

// ============================================================================
// Helper Functions for Environment Variable Parsing
// ============================================================================

/// Get environment variable or return default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get boolean environment variable with default
fn get_bool_env(key: &str, default: bool) -> bool {
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or(default)
}

/// Get u64 environment variable with default
fn get_u64_env(key: &str, default: u64) -> Result<u64> {
    Ok(std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .context(format!("Failed to parse {} as u64", key))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_env_falls_back_to_default_when_unset() {
        std::env::remove_var("CONFIG_TEST_MISSING_BOOL");
        assert!(!get_bool_env("CONFIG_TEST_MISSING_BOOL", false));
    }

    #[test]
    fn bool_env_parses_set_value() {
        std::env::set_var("CONFIG_TEST_BOOL", "true");
        assert!(get_bool_env("CONFIG_TEST_BOOL", false));
        std::env::remove_var("CONFIG_TEST_BOOL");
    }

    #[test]
    fn u64_env_falls_back_to_default_when_unset() {
        std::env::remove_var("CONFIG_TEST_MISSING_U64");
        assert_eq!(get_u64_env("CONFIG_TEST_MISSING_U64", 30).unwrap(), 30);
    }
}
