//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Horizon endpoint of the Stellar test network.
pub const TESTNET_HORIZON_URL: &str = "https://horizon-testnet.stellar.org";

/// Network passphrase of the Stellar test network.
pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";

/// Donation contract deployed on testnet.
pub const DONATION_CONTRACT_ID: &str = "CASELEFWAMO6QUBDRPD2HUV6JQ4MB7TERSJTCBLLW7MCEQ7MP3FOIGSU";

/// Root configuration for the donation service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration.
    pub server: ServerConfig,

    /// Stellar network settings.
    pub network: NetworkConfig,

    /// Donation contract settings.
    pub contract: ContractConfig,

    /// Persisted session settings.
    pub session: SessionConfig,

    /// Signing wallet settings.
    pub wallet: WalletConfig,

    /// Statistics source settings.
    pub stats: StatsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:3000").
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Stellar network configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Horizon REST endpoint.
    pub horizon_url: String,

    /// Passphrase the transactions are signed under.
    pub network_passphrase: String,

    /// Fee per operation in stroops.
    pub base_fee: u32,

    /// Validity window of a built transaction in seconds.
    pub tx_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            horizon_url: TESTNET_HORIZON_URL.to_string(),
            network_passphrase: TESTNET_PASSPHRASE.to_string(),
            base_fee: 100,
            tx_timeout_secs: 300,
        }
    }
}

/// Donation contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Contract identifier (`C...` strkey).
    pub contract_id: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            contract_id: DONATION_CONTRACT_ID.to_string(),
        }
    }
}

/// Session persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// JSON file holding the persisted key/value entries.
    pub storage_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_path: "hopechain-session.json".to_string(),
        }
    }
}

/// Signing wallet configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Environment variable holding the `S...` secret seed.
    pub secret_env_var: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            secret_env_var: "HOPECHAIN_WALLET_SECRET".to_string(),
        }
    }
}

/// Where donation statistics come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StatsMode {
    /// Randomly generated figures.
    #[default]
    Mock,
}

/// Statistics configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StatsConfig {
    pub mode: StatsMode,
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time allowed for one inbound HTTP request in seconds.
    pub request_secs: u64,

    /// Timeout for a single Horizon call in seconds.
    pub horizon_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 60,
            horizon_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_testnet() {
        let config = AppConfig::default();
        assert_eq!(config.network.horizon_url, TESTNET_HORIZON_URL);
        assert_eq!(config.network.network_passphrase, TESTNET_PASSPHRASE);
        assert_eq!(config.network.base_fee, 100);
        assert_eq!(config.network.tx_timeout_secs, 300);
        assert_eq!(config.contract.contract_id, DONATION_CONTRACT_ID);
        assert_eq!(config.stats.mode, StatsMode::Mock);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [network]
            base_fee = 200

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.network.base_fee, 200);
        assert_eq!(config.network.horizon_url, TESTNET_HORIZON_URL);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.session.storage_path, "hopechain-session.json");
    }
}
