//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and references to
//! supported chains. All errors are collected, not just the first.

use alloy::primitives::Address;

use crate::chains::ChainId;
use crate::config::schema::MarketConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &MarketConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if ChainId::try_from(config.network.default_chain_id).is_err() {
        errors.push(ValidationError::new(
            "network.default_chain_id",
            format!("unsupported chain {}", config.network.default_chain_id),
        ));
    }

    for (i, chain) in config.network.chains.iter().enumerate() {
        let prefix = format!("network.chains[{}]", i);
        if ChainId::try_from(chain.chain_id).is_err() {
            errors.push(ValidationError::new(
                format!("{}.chain_id", prefix),
                format!("unsupported chain {}", chain.chain_id),
            ));
        }
        let urls = chain.rpc_url.iter().chain(chain.failover_urls.iter());
        for url in urls {
            if url.parse::<url::Url>().is_err() {
                errors.push(ValidationError::new(
                    format!("{}.rpc_url", prefix),
                    format!("invalid URL '{}'", url),
                ));
            }
        }
        if let Some(address) = &chain.yam_address {
            if address.parse::<Address>().is_err() {
                errors.push(ValidationError::new(
                    format!("{}.yam_address", prefix),
                    format!("invalid address '{}'", address),
                ));
            }
        }
    }

    if config.blockchain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("blockchain.rpc_timeout_secs", "must be > 0"));
    }
    if config.blockchain.confirmation_blocks == 0 {
        errors.push(ValidationError::new("blockchain.confirmation_blocks", "must be > 0"));
    }
    if config.blockchain.receipt_poll_ms == 0 {
        errors.push(ValidationError::new("blockchain.receipt_poll_ms", "must be > 0"));
    }

    if config.poller.interval_secs == 0 {
        errors.push(ValidationError::new("poller.interval_secs", "must be > 0"));
    }
    let retry = &config.poller.retry;
    if retry.max_attempts == 0 {
        errors.push(ValidationError::new("poller.retry.max_attempts", "must be >= 1"));
    }
    if retry.base_delay_ms > retry.max_delay_ms {
        errors.push(ValidationError::new(
            "poller.retry.base_delay_ms",
            "must not exceed max_delay_ms",
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", config.observability.metrics_address),
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
    use crate::config::schema::ChainOverride;

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&MarketConfig::default()).is_ok());
    }

    #[test]
    fn test_unknown_chains() {
        let mut config = MarketConfig::default();
        config.network.default_chain_id = 137;
        config.network.chains.push(ChainOverride {
            chain_id: 42,
            ..ChainOverride::default()
        });

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["network.default_chain_id", "network.chains[0].chain_id"]);
    }

    #[test]
    fn test_bad_override_values() {
        let mut config = MarketConfig::default();
        config.network.chains.push(ChainOverride {
            chain_id: 5,
            rpc_url: Some("not a url".to_string()),
            yam_address: Some("0x1234".to_string()),
            ..ChainOverride::default()
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[1].to_string().contains("invalid address"));
    }

    #[test]
    fn test_retry_delays() {
        let mut config = MarketConfig::default();
        config.poller.retry.base_delay_ms = 10_000;
        config.poller.retry.max_attempts = 0;
        assert_eq!(validate_config(&config).unwrap_err().len(), 2);
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = MarketConfig::default();
        config.observability.metrics_address = "nowhere".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
