//! # Configuration Management
//!
//! Environment-driven configuration for the secret chain, the connection
//! manager and the auth middleware.

pub mod settings;

pub use settings::{
    AuthConfig, DatabaseConfig, Environment, FailurePolicy, GuardConfig, Locale,
    ObservabilityConfig, RetryConfig, SecretsConfig, ServiceConfig,
};
