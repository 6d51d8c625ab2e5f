//! Environment variable secret tier.
//!
//! Consulted only after the mounted store failed. Each secret maps to one
//! variable, named by [`SecretKey::env_var`]:
//!
//! ```bash
//! export JWT_SECRET="jwt-secret"
//! export DATABASE_URL="postgres://app:pw@db:5432/orders"
//! ```

use async_trait::async_trait;
use std::env;

use super::error::{Result, SecretsError};
use super::source::SecretSource;
use super::types::{SecretKey, SecretOrigin};

/// Reads secrets from the process environment.
///
/// Empty variables count as unset.
#[derive(Debug, Clone, Default)]
pub struct EnvSecretSource {
    // No internal state needed - reads directly from env
}

impl EnvSecretSource {
    /// Creates a new environment variable tier.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretSource for EnvSecretSource {
    fn origin(&self) -> SecretOrigin {
        SecretOrigin::Environment
    }

    async fn fetch(&self, key: &SecretKey) -> Result<String> {
        match env::var(key.env_var()) {
            Ok(value) if !value.is_empty() => Ok(value),
            Ok(_) => Err(SecretsError::unavailable(
                key.name(),
                format!("environment variable {} is empty", key.env_var()),
            )),
            Err(env::VarError::NotPresent) => Err(SecretsError::unavailable(
                key.name(),
                format!("environment variable {} is not set", key.env_var()),
            )),
            Err(env::VarError::NotUnicode(_)) => Err(SecretsError::unavailable(
                key.name(),
                format!("environment variable {} is not valid unicode", key.env_var()),
            )),
        }
    }
}
