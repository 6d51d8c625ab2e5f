//! # Error Types
//!
//! Crate-level error type for the service guard using `thiserror`.

use crate::secrets::SecretsError;

/// Custom result type for service guard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for startup and supervision paths.
///
/// Per-request authentication failures never surface here; they are fully
/// contained by the middleware as [`crate::auth::AuthError`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Secret resolution errors (missing required credentials)
    #[error(transparent)]
    Secrets(#[from] SecretsError),

    /// Database connection could not be established. `uri` is always redacted.
    #[error("Connection to {uri} failed: {reason}")]
    ConnectionFailed { uri: String, reason: String },

    /// Database driver errors
    #[error("Database error: {context}")]
    Database {
        #[source]
        source: sqlx::Error,
        context: String,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a connection failure for an already redacted URI
    pub fn connection_failed<U: Into<String>, R: Into<String>>(uri: U, reason: R) -> Self {
        Self::ConnectionFailed { uri: uri.into(), reason: reason.into() }
    }

    /// Whether a supervisor may reasonably try the operation again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::ConnectionFailed { .. } | Error::Database { .. } | Error::Io(_))
    }
}

impl From<sqlx::Error> for Error {
    fn from(error: sqlx::Error) -> Self {
        Self::Database { source: error, context: "Database operation failed".to_string() }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::config(format!("Validation failed: {}", errors))
    }
}
