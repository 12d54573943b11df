//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (fees and timeouts > 0, addresses parse)
//! - Check identifiers have the right strkey shape
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// Human readable description.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("'{}' is not a socket address", config.server.bind_address),
        ));
    }

    match url::Url::parse(&config.network.horizon_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "network.horizon_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "network.horizon_url",
            format!("invalid URL '{}': {}", config.network.horizon_url, e),
        )),
    }

    if config.network.network_passphrase.trim().is_empty() {
        errors.push(ValidationError::new(
            "network.network_passphrase",
            "must not be empty",
        ));
    }

    if config.network.base_fee == 0 {
        errors.push(ValidationError::new("network.base_fee", "must be > 0"));
    }

    if config.network.tx_timeout_secs == 0 {
        errors.push(ValidationError::new("network.tx_timeout_secs", "must be > 0"));
    }

    if stellar_strkey::Contract::from_string(&config.contract.contract_id).is_err() {
        errors.push(ValidationError::new(
            "contract.contract_id",
            format!("'{}' is not a contract strkey", config.contract.contract_id),
        ));
    }

    if config.session.storage_path.trim().is_empty() {
        errors.push(ValidationError::new("session.storage_path", "must not be empty"));
    }

    if config.wallet.secret_env_var.trim().is_empty() {
        errors.push(ValidationError::new("wallet.secret_env_var", "must not be empty"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    if config.timeouts.horizon_secs == 0 {
        errors.push(ValidationError::new("timeouts.horizon_secs", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.network.horizon_url = "not a url".to_string();
        config.network.base_fee = 0;
        config.contract.contract_id = "GABC".to_string();
        config.timeouts.horizon_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "network.horizon_url",
                "network.base_fee",
                "contract.contract_id",
                "timeouts.horizon_secs",
            ]
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = AppConfig::default();
        config.observability.metrics_address = "nowhere".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let mut config = AppConfig::default();
        config.network.horizon_url = "ftp://horizon.example".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].message.contains("ftp"));
    }
}
