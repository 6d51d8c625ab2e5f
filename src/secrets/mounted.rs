//! Mounted secret store tier (`/run/secrets/<name>`).
//!
//! One read-only UTF-8 file per secret, as injected by container
//! orchestrators. File contents are trimmed of surrounding whitespace.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::{Result, SecretsError};
use super::source::SecretSource;
use super::types::{SecretKey, SecretOrigin};

/// Conventional mount point for orchestrator-injected secrets.
pub const DEFAULT_SECRETS_DIR: &str = "/run/secrets";

/// Reads one file per secret from a mount directory.
#[derive(Debug, Clone)]
pub struct MountedSecretStore {
    root: PathBuf,
}

impl MountedSecretStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path the store reads for `key`.
    pub fn path_for(&self, key: &SecretKey) -> PathBuf {
        self.root.join(key.name())
    }
}

impl Default for MountedSecretStore {
    fn default() -> Self {
        Self::new(DEFAULT_SECRETS_DIR)
    }
}

#[async_trait]
impl SecretSource for MountedSecretStore {
    fn origin(&self) -> SecretOrigin {
        SecretOrigin::MountedStore
    }

    async fn fetch(&self, key: &SecretKey) -> Result<String> {
        // Secret names must stay inside the mount directory.
        if key.name().is_empty() || key.name().contains(['/', '\\']) || key.name() == ".." {
            return Err(SecretsError::unavailable(key.name(), "invalid secret file name"));
        }

        let path = self.path_for(key);
        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
            SecretsError::unavailable(key.name(), format!("{}: {}", path.display(), e))
        })?;

        Ok(contents.trim().to_string())
    }
}
