//! # Structured Logging
//!
//! Installs the process-wide `tracing` subscriber. Output is human readable
//! by default or one JSON object per line when `json_logging` is set.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{GuardConfig, ObservabilityConfig};
use crate::errors::{Error, Result};

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `log_level`. A second call fails with
/// [`Error::Config`] instead of panicking.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json_logging {
        registry.with(fmt::layer().json().with_current_span(true).with_target(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };
    installed.map_err(|e| Error::config(format!("Failed to install log subscriber: {}", e)))?;

    tracing::debug!(log_level = %config.log_level, json = config.json_logging, "Logging initialized");
    Ok(())
}

fn build_filter(config: &ObservabilityConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(&config.log_level)
        .map_err(|e| Error::config(format!("Invalid log level '{}': {}", config.log_level, e)))
}

/// Log the effective configuration. Secret values are never part of it.
pub fn log_config_info(config: &GuardConfig) {
    tracing::info!(
        service = %config.service.name,
        environment = ?config.environment,
        secrets_dir = %config.secrets.mount_dir.display(),
        cache_credentials = config.secrets.cache_credentials,
        connection_secret = %config.connection_secret_key(),
        failure_policy = ?config.database.failure_policy,
        auth_locale = ?config.auth.locale,
        "Service guard configuration"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_an_error() {
        let config = ObservabilityConfig::default();

        // The first call may lose to another test installing a subscriber.
        let _ = init_logging(&config);
        let err = init_logging(&config).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_log_config_info() {
        let config = GuardConfig::default();

        // This should not panic
        log_config_info(&config);
    }
}
