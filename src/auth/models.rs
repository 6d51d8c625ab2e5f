//! Request-scoped identity and authentication errors.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::secrets::SecretsError;

/// Decoded token claims for the lifetime of one request.
///
/// Inserted into the request extensions by the middleware; handlers read it
/// with `Extension<AuthContext>`. Never persisted or shared across requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AuthContext {
    claims: Map<String, Value>,
}

impl AuthContext {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self { claims }
    }

    /// The `sub` claim, when it is a string.
    pub fn sub(&self) -> Option<&str> {
        self.claims.get("sub").and_then(Value::as_str)
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    pub fn into_claims(self) -> Map<String, Value> {
        self.claims
    }
}

/// Outcome classes a client can observe. All of them are `401`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingHeader,
    MalformedToken,
    InvalidToken,
}

/// Errors returned by the authentication middleware.
///
/// [`AuthError::SigningSecretUnavailable`] is an operator problem, not a
/// client one; it is kept apart internally even though the client sees the
/// same [`Rejection::InvalidToken`].
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unauthorized: authorization header missing")]
    MissingHeader,
    #[error("unauthorized: malformed bearer token")]
    MalformedToken,
    #[error("unauthorized: invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("signing secret unavailable: {0}")]
    SigningSecretUnavailable(#[source] SecretsError),
}

impl AuthError {
    /// Stable machine code for logs.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "missing_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::SigningSecretUnavailable(_) => "signing_secret_unavailable",
        }
    }

    pub fn rejection(&self) -> Rejection {
        match self {
            AuthError::MissingHeader => Rejection::MissingHeader,
            AuthError::MalformedToken => Rejection::MalformedToken,
            AuthError::InvalidToken(_) | AuthError::SigningSecretUnavailable(_) => {
                Rejection::InvalidToken
            }
        }
    }

    /// Whether the failure points at server configuration rather than the caller.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(self, AuthError::SigningSecretUnavailable(_))
    }
}
