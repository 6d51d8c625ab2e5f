//! Error types for secret resolution.

use thiserror::Error;

/// Result type for secrets operations.
pub type Result<T> = std::result::Result<T, SecretsError>;

/// Errors that can occur while resolving secrets.
///
/// Neither variant ever carries a secret value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecretsError {
    /// A single tier of the fallback chain could not supply the secret.
    ///
    /// Recovered locally by the resolver; only the next tier is consulted.
    #[error("Secret '{key}' unavailable: {reason}")]
    Unavailable { key: String, reason: String },

    /// A required secret was absent after the full fallback chain.
    #[error("Required credential '{key}' is not configured")]
    MissingCredential { key: String },
}

impl SecretsError {
    /// Create an unavailable error for one tier.
    pub fn unavailable(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable { key: key.into(), reason: reason.into() }
    }

    /// Create a missing credential error.
    pub fn missing_credential(key: impl Into<String>) -> Self {
        Self::MissingCredential { key: key.into() }
    }

    /// Name of the secret the error is about.
    pub fn key(&self) -> &str {
        match self {
            Self::Unavailable { key, .. } | Self::MissingCredential { key } => key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let err = SecretsError::unavailable("jwt_secret", "No such file or directory");
        assert!(matches!(err, SecretsError::Unavailable { .. }));
        assert_eq!(err.key(), "jwt_secret");
        assert_eq!(
            err.to_string(),
            "Secret 'jwt_secret' unavailable: No such file or directory"
        );

        let err = SecretsError::missing_credential("database_uri_orders");
        assert_eq!(err.key(), "database_uri_orders");
        assert!(err.to_string().contains("database_uri_orders"));
    }
}
