//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the `limit` rate expression and burst window
//! - Check listener and metrics addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Pure function: &ConcentratorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ConcentratorConfig;
use crate::connlimit::rate::{RateLimit, RateParseError};

/// A single semantic problem in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("connlimit.limit: {0}")]
    Limit(#[from] RateParseError),

    #[error("connlimit.burst: must be at least 1")]
    BurstZero,

    #[error("connlimit.timeout: must be at least 1 second")]
    TimeoutZero,

    #[error("cli.bind-address: '{0}' is not a socket address")]
    CliAddress(String),

    #[error("observability.metrics-address: '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ConcentratorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(limit) = &config.connlimit.limit {
        if let Err(e) = limit.parse::<RateLimit>() {
            errors.push(ValidationError::Limit(e));
        }
    }

    if config.connlimit.burst == 0 {
        errors.push(ValidationError::BurstZero);
    }
    if config.connlimit.timeout == 0 {
        errors.push(ValidationError::TimeoutZero);
    }

    if config.cli.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::CliAddress(config.cli.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
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
        assert!(validate_config(&ConcentratorConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ConcentratorConfig::default();
        config.connlimit.limit = Some("0/1s".to_string());
        config.cli.bind_address = "localhost".to_string();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], ValidationError::Limit(RateParseError::ZeroCount(_))));
        assert!(errors[1].to_string().contains("localhost"));
    }

    #[test]
    fn test_oversized_period_is_rejected() {
        let mut config = ConcentratorConfig::default();
        config.connlimit.limit = Some("1/9999999999999999999h".to_string());

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[..], [ValidationError::Limit(RateParseError::Overflow(_))]));
    }

    #[test]
    fn test_zero_burst_window() {
        let mut config = ConcentratorConfig::default();
        config.connlimit.burst = 0;
        config.connlimit.timeout = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::BurstZero, ValidationError::TimeoutZero]);
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = ConcentratorConfig::default();
        config.observability.metrics_address = "nowhere".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
