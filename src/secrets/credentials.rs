//! Required credentials on top of the resolver.
//!
//! [`CredentialProvider::require_credential`] is the single enforcement point
//! for secrets that must be configured. It resolves fresh on every call
//! unless caching was switched on, in which case resolved credentials are
//! memoized until [`CredentialProvider::reload`] or
//! [`CredentialProvider::reload_key`] is called.
//!
//! # Example
//!
//! ```rust,ignore
//! use service_guard::secrets::{CredentialProvider, SecretResolver};
//!
//! let provider = CredentialProvider::from_config(&config);
//! let signing = provider.signing_secret().await?;
//! let uri = provider.connection_uri().await?;
//! ```

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::error::{Result, SecretsError};
use super::resolver::SecretResolver;
use super::types::{Credential, SecretKey};
use crate::config::GuardConfig;

/// Produces non-empty credentials or fails with
/// [`SecretsError::MissingCredential`].
#[derive(Debug)]
pub struct CredentialProvider {
    resolver: SecretResolver,
    signing_key: SecretKey,
    connection_key: SecretKey,
    cache: Option<RwLock<HashMap<SecretKey, Credential>>>,
}

impl CredentialProvider {
    /// Provider with the default signing key (`jwt_secret`) and the given
    /// connection URI key.
    pub fn new(resolver: SecretResolver, connection_key: SecretKey) -> Self {
        Self {
            resolver,
            signing_key: SecretKey::new("jwt_secret"),
            connection_key,
            cache: None,
        }
    }

    /// Provider wired from service configuration.
    pub fn from_config(config: &GuardConfig) -> Self {
        let provider = Self::new(
            SecretResolver::from_mount_dir(&config.secrets.mount_dir),
            config.connection_secret_key(),
        )
        .with_signing_key(config.signing_secret_key());

        if config.secrets.cache_credentials {
            provider.with_cache()
        } else {
            provider
        }
    }

    pub fn with_signing_key(mut self, key: SecretKey) -> Self {
        self.signing_key = key;
        self
    }

    /// Memoize resolved credentials for the process lifetime.
    pub fn with_cache(mut self) -> Self {
        self.cache = Some(RwLock::new(HashMap::new()));
        self
    }

    pub fn signing_key(&self) -> &SecretKey {
        &self.signing_key
    }

    pub fn connection_key(&self) -> &SecretKey {
        &self.connection_key
    }

    /// Resolve `key` and insist on a non-empty value.
    ///
    /// # Errors
    ///
    /// [`SecretsError::MissingCredential`] when every tier came up empty.
    /// Never retried and never defaulted.
    pub async fn require_credential(&self, key: &SecretKey) -> Result<Credential> {
        if let Some(cache) = &self.cache {
            if let Some(credential) = cache.read().await.get(key) {
                return Ok(credential.clone());
            }
        }

        let secret = self.resolver.resolve(key).await;
        let credential = Credential::from_secret(secret).ok_or_else(|| {
            tracing::error!(
                secret = %key,
                env_var = %key.env_var(),
                "Required credential not found in secrets or environment"
            );
            SecretsError::missing_credential(key.name())
        })?;

        if let Some(cache) = &self.cache {
            cache.write().await.insert(key.clone(), credential.clone());
        }

        Ok(credential)
    }

    /// Token signing secret.
    pub async fn signing_secret(&self) -> Result<Credential> {
        self.require_credential(&self.signing_key).await
    }

    /// Database connection URI for this service.
    pub async fn connection_uri(&self) -> Result<Credential> {
        self.require_credential(&self.connection_key).await
    }

    /// Drop every memoized credential. No-op when caching is off.
    pub async fn reload(&self) {
        if let Some(cache) = &self.cache {
            let mut cache = cache.write().await;
            let count = cache.len();
            cache.clear();
            tracing::info!(count, "Cleared cached credentials");
        }
    }

    /// Drop the memoized value of a single credential.
    pub async fn reload_key(&self, key: &SecretKey) {
        if let Some(cache) = &self.cache {
            if cache.write().await.remove(key).is_some() {
                tracing::debug!(secret = %key, "Invalidated cached credential");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::mounted::MountedSecretStore;
    use crate::secrets::types::SecretOrigin;

    fn file_provider(dir: &std::path::Path) -> CredentialProvider {
        let resolver = SecretResolver::new(vec![Box::new(MountedSecretStore::new(dir))]);
        CredentialProvider::new(resolver, SecretKey::new("database_uri_orders"))
    }

    #[tokio::test]
    async fn test_require_credential_trims_file_value() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("jwt_secret"), "s3cr3t\n").unwrap();

        let provider = file_provider(dir.path());
        let credential = provider.signing_secret().await.unwrap();
        assert_eq!(credential.expose_secret(), "s3cr3t");
        assert_eq!(credential.origin(), SecretOrigin::MountedStore);
    }

    #[tokio::test]
    async fn test_missing_credential_carries_name() {
        let dir = tempfile::tempdir().unwrap();
        let provider = file_provider(dir.path());

        let err = provider.connection_uri().await.unwrap_err();
        assert_eq!(err, SecretsError::missing_credential("database_uri_orders"));
    }

    #[tokio::test]
    async fn test_empty_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("jwt_secret"), "  \n").unwrap();

        let provider = file_provider(dir.path());
        assert!(matches!(
            provider.signing_secret().await,
            Err(SecretsError::MissingCredential { .. })
        ));
    }

    #[tokio::test]
    async fn test_uncached_provider_sees_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let provider = file_provider(dir.path());

        std::fs::write(dir.path().join("jwt_secret"), "first").unwrap();
        assert_eq!(provider.signing_secret().await.unwrap().expose_secret(), "first");

        std::fs::write(dir.path().join("jwt_secret"), "second").unwrap();
        assert_eq!(provider.signing_secret().await.unwrap().expose_secret(), "second");
    }

    #[tokio::test]
    async fn test_cached_provider_holds_until_reload() {
        let dir = tempfile::tempdir().unwrap();
        let provider = file_provider(dir.path()).with_cache();

        std::fs::write(dir.path().join("jwt_secret"), "first").unwrap();
        assert_eq!(provider.signing_secret().await.unwrap().expose_secret(), "first");

        std::fs::write(dir.path().join("jwt_secret"), "second").unwrap();
        assert_eq!(provider.signing_secret().await.unwrap().expose_secret(), "first");

        provider.reload_key(&SecretKey::new("jwt_secret")).await;
        assert_eq!(provider.signing_secret().await.unwrap().expose_secret(), "second");

        std::fs::write(dir.path().join("jwt_secret"), "third").unwrap();
        provider.reload().await;
        assert_eq!(provider.signing_secret().await.unwrap().expose_secret(), "third");
    }

    #[tokio::test]
    async fn test_cache_never_holds_missing_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let provider = file_provider(dir.path()).with_cache();

        assert!(provider.signing_secret().await.is_err());

        std::fs::write(dir.path().join("jwt_secret"), "late").unwrap();
        assert_eq!(provider.signing_secret().await.unwrap().expose_secret(), "late");
    }

    #[test]
    fn test_from_config_keys() {
        let mut config = GuardConfig::default();
        config.service.name = "products".to_string();
        config.auth.signing_secret_name = "token_key".to_string();

        let provider = CredentialProvider::from_config(&config);
        assert_eq!(provider.connection_key().name(), "database_uri_products");
        assert_eq!(provider.signing_key().name(), "token_key");
        assert_eq!(provider.signing_key().env_var(), "TOKEN_KEY");
    }
}
