//! # Configuration Settings
//!
//! Defines the configuration structure shared by every service embedding the
//! guard. All values come from `GUARD_*` environment variables with defaults.

use crate::errors::{Error, Result};
use crate::secrets::{SecretKey, DEFAULT_SECRETS_DIR};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use validator::Validate;

/// Deployment mode. `Test` suppresses process termination on fatal startup
/// failures so test runners can exercise those paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
    Test,
}

impl Environment {
    pub fn is_test(&self) -> bool {
        matches!(self, Environment::Test)
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            other => Err(Error::config(format!("Invalid environment: {}", other))),
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct GuardConfig {
    /// Deployment mode
    pub environment: Environment,

    /// Service identity
    #[validate(nested)]
    pub service: ServiceConfig,

    /// Secret store configuration
    #[validate(nested)]
    pub secrets: SecretsConfig,

    /// Database bootstrap configuration
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Bearer token verification
    #[validate(nested)]
    pub auth: AuthConfig,

    /// Logging configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl GuardConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            environment: env_parse("GUARD_ENV")?.unwrap_or_default(),
            service: ServiceConfig::from_env(),
            secrets: SecretsConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            observability: ObservabilityConfig::from_env()?,
        })
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()
    }

    fn validate_custom(&self) -> Result<()> {
        let name = &self.service.name;
        if !name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
        {
            return Err(Error::config(format!(
                "Service name '{}' may only contain lowercase letters, digits, '_' and '-'",
                name
            )));
        }

        let retry = &self.database.retry;
        if retry.max_delay_ms < retry.initial_delay_ms {
            return Err(Error::config("Retry max delay cannot be smaller than the initial delay"));
        }

        Ok(())
    }

    /// Secret holding this service's database URI, e.g. `database_uri_orders`.
    pub fn connection_secret_key(&self) -> SecretKey {
        SecretKey::new(format!("{}_{}", self.database.secret_prefix, self.service.name))
            .with_env_var(&self.database.uri_env_var)
    }

    /// Secret holding the shared token signing key.
    pub fn signing_secret_key(&self) -> SecretKey {
        SecretKey::new(&self.auth.signing_secret_name)
    }
}

/// Service identity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServiceConfig {
    /// Service name, used for secret name derivation and log context
    #[validate(length(min = 1, max = 64, message = "Service name must be 1-64 characters"))]
    pub name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { name: "service".to_string() }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let name = std::env::var("GUARD_SERVICE_NAME").unwrap_or_else(|_| Self::default().name);
        Self { name }
    }
}

/// Secret store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SecretsConfig {
    /// Directory holding one file per secret
    pub mount_dir: PathBuf,

    /// Memoize resolved credentials until an explicit reload
    pub cache_credentials: bool,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self { mount_dir: PathBuf::from(DEFAULT_SECRETS_DIR), cache_credentials: false }
    }
}

impl SecretsConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            mount_dir: std::env::var("GUARD_SECRETS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.mount_dir),
            cache_credentials: env_bool("GUARD_CACHE_CREDENTIALS")?
                .unwrap_or(defaults.cache_credentials),
        })
    }
}

/// What the connection manager does when an attempt fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Surface a fatal diagnostic and terminate the process
    #[default]
    Exit,
    /// Start degraded and retry with bounded backoff
    Retry,
}

impl FromStr for FailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "exit" => Ok(FailurePolicy::Exit),
            "retry" => Ok(FailurePolicy::Retry),
            other => Err(Error::config(format!(
                "Invalid failure policy '{}': expected 'exit' or 'retry'",
                other
            ))),
        }
    }
}

/// Backoff schedule for the retry policy
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RetryConfig {
    /// Delay before the first retry
    #[validate(range(min = 1, message = "Initial retry delay must be at least 1ms"))]
    pub initial_delay_ms: u64,

    /// Upper bound for the doubled delay
    #[validate(range(min = 1, message = "Max retry delay must be at least 1ms"))]
    pub max_delay_ms: u64,

    /// Retries before giving up (0 = never give up)
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { initial_delay_ms: 5_000, max_delay_ms: 60_000, max_attempts: 10 }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (1-based): initial * 2^(attempt-1), capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32);
        let delay = self.initial_delay_ms.saturating_mul(1u64 << exponent);
        Duration::from_millis(delay.min(self.max_delay_ms))
    }

    /// Whether another retry is allowed after `attempts` retries
    pub fn allows(&self, attempts: u32) -> bool {
        self.max_attempts == 0 || attempts < self.max_attempts
    }
}

/// Database bootstrap configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// Prefix of the per-service URI secret (`<prefix>_<service>`)
    #[validate(length(min = 1, message = "Secret prefix cannot be empty"))]
    pub secret_prefix: String,

    /// Environment variable consulted when the URI secret file is unreadable
    #[validate(length(min = 1, message = "URI environment variable cannot be empty"))]
    pub uri_env_var: String,

    /// Maximum number of connections in the pool
    #[validate(range(min = 1, max = 100, message = "Max connections must be between 1 and 100"))]
    pub max_connections: u32,

    /// Connection timeout in seconds
    #[validate(range(
        min = 1,
        max = 60,
        message = "Connect timeout must be between 1 and 60 seconds"
    ))]
    pub connect_timeout_seconds: u64,

    /// Failure handling
    pub failure_policy: FailurePolicy,

    /// Backoff for [`FailurePolicy::Retry`]
    #[validate(nested)]
    pub retry: RetryConfig,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            secret_prefix: "database_uri".to_string(),
            uri_env_var: "DATABASE_URL".to_string(),
            max_connections: 10,
            connect_timeout_seconds: 10,
            failure_policy: FailurePolicy::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl DatabaseConfig {
    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            secret_prefix: std::env::var("GUARD_DATABASE_SECRET_PREFIX")
                .unwrap_or(defaults.secret_prefix),
            uri_env_var: std::env::var("GUARD_DATABASE_URI_ENV").unwrap_or(defaults.uri_env_var),
            max_connections: env_parse("GUARD_DATABASE_MAX_CONNECTIONS")?
                .unwrap_or(defaults.max_connections),
            connect_timeout_seconds: env_parse("GUARD_DATABASE_CONNECT_TIMEOUT_SECONDS")?
                .unwrap_or(defaults.connect_timeout_seconds),
            failure_policy: env_parse("GUARD_DATABASE_FAILURE_POLICY")?
                .unwrap_or(defaults.failure_policy),
            retry: RetryConfig {
                initial_delay_ms: env_parse("GUARD_DATABASE_RETRY_INITIAL_MS")?
                    .unwrap_or(defaults.retry.initial_delay_ms),
                max_delay_ms: env_parse("GUARD_DATABASE_RETRY_MAX_MS")?
                    .unwrap_or(defaults.retry.max_delay_ms),
                max_attempts: env_parse("GUARD_DATABASE_RETRY_MAX_ATTEMPTS")?
                    .unwrap_or(defaults.retry.max_attempts),
            },
        })
    }
}

/// Language of the rejection messages sent to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "fr" => Ok(Locale::Fr),
            other => Err(Error::config(format!("Unsupported locale: {}", other))),
        }
    }
}

/// Bearer token verification configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AuthConfig {
    /// Name of the shared signing secret
    #[validate(length(min = 1, message = "Signing secret name cannot be empty"))]
    pub signing_secret_name: String,

    /// Leeway in seconds for `exp` / `nbf`
    #[validate(range(max = 300, message = "Leeway cannot exceed 300 seconds"))]
    pub leeway_seconds: u64,

    /// Rejection message language
    pub locale: Locale,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_secret_name: "jwt_secret".to_string(),
            leeway_seconds: 0,
            locale: Locale::default(),
        }
    }
}

impl AuthConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            signing_secret_name: std::env::var("GUARD_SIGNING_SECRET_NAME")
                .unwrap_or(defaults.signing_secret_name),
            leeway_seconds: env_parse("GUARD_AUTH_LEEWAY_SECONDS")?
                .unwrap_or(defaults.leeway_seconds),
            locale: env_parse("GUARD_AUTH_LOCALE")?.unwrap_or(defaults.locale),
        })
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logging: false }
    }
}

impl ObservabilityConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            log_level: std::env::var("GUARD_LOG_LEVEL").unwrap_or(defaults.log_level),
            json_logging: env_bool("GUARD_JSON_LOGGING")?.unwrap_or(defaults.json_logging),
        })
    }
}

fn env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::config(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(None),
    }
}

fn env_bool(name: &str) -> Result<Option<bool>> {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            other => Err(Error::config(format!("Invalid {}: {}", name, other))),
        },
        Err(_) => Ok(None),
    }
}
