//! Layered secret resolution.
//!
//! The resolver walks its tiers in order (mounted store first, environment
//! second) and returns the first value it finds. A tier failure is logged as
//! a warning so operators can spot a broken secret mount, then the next tier
//! is tried. Exhausting every tier is not an error: the resolver returns an
//! [`SecretOrigin::Absent`] secret and leaves criticality to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use service_guard::secrets::{SecretKey, SecretResolver};
//!
//! let resolver = SecretResolver::from_mount_dir("/run/secrets");
//! let secret = resolver.resolve(&SecretKey::new("jwt_secret")).await;
//! ```

use std::path::PathBuf;

use super::env::EnvSecretSource;
use super::mounted::MountedSecretStore;
use super::source::SecretSource;
use super::types::{Secret, SecretKey};

/// Ordered fallback chain of [`SecretSource`] tiers.
///
/// Nothing is cached; every call re-reads every tier it needs.
pub struct SecretResolver {
    tiers: Vec<Box<dyn SecretSource>>,
}

impl SecretResolver {
    /// Resolver over an explicit tier list, tried in order.
    pub fn new(tiers: Vec<Box<dyn SecretSource>>) -> Self {
        Self { tiers }
    }

    /// Mounted store at `dir`, then the process environment.
    pub fn from_mount_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(vec![
            Box::new(MountedSecretStore::new(dir)),
            Box::new(EnvSecretSource::new()),
        ])
    }

    /// Resolve `key` through the chain. Never fails.
    pub async fn resolve(&self, key: &SecretKey) -> Secret {
        let mut tiers = self.tiers.iter().peekable();
        while let Some(tier) = tiers.next() {
            match tier.fetch(key).await {
                Ok(value) => {
                    tracing::debug!(
                        secret = %key,
                        origin = %tier.origin(),
                        "Resolved secret"
                    );
                    return Secret::new(key.name(), value.into(), tier.origin());
                }
                Err(error) => match tiers.peek() {
                    Some(next) => {
                        tracing::warn!(
                            secret = %key,
                            origin = %tier.origin(),
                            fallback = %next.origin(),
                            error = %error,
                            "Secret not found, falling back"
                        );
                    }
                    None => {
                        tracing::debug!(
                            secret = %key,
                            origin = %tier.origin(),
                            error = %error,
                            "Secret not available from last tier"
                        );
                    }
                },
            }
        }

        Secret::absent(key.name())
    }
}

impl Default for SecretResolver {
    fn default() -> Self {
        Self::from_mount_dir(super::mounted::DEFAULT_SECRETS_DIR)
    }
}

impl std::fmt::Debug for SecretResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let origins: Vec<_> = self.tiers.iter().map(|t| t.origin()).collect();
        f.debug_struct("SecretResolver").field("tiers", &origins).finish()
    }
}
