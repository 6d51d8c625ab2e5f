//! Bearer token verification.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

use super::models::{AuthContext, AuthError};
use crate::config::AuthConfig;
use crate::secrets::CredentialProvider;

/// Verifies HMAC-signed tokens against the signing secret.
///
/// The secret is looked up through the [`CredentialProvider`] on every
/// verification, so a missing secret is reported per request.
pub struct TokenVerifier {
    credentials: Arc<CredentialProvider>,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(credentials: Arc<CredentialProvider>, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // exp/nbf are checked when present but not required.
        validation.required_spec_claims = HashSet::new();
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = leeway_seconds;

        Self { credentials, validation }
    }

    pub fn from_config(credentials: Arc<CredentialProvider>, config: &AuthConfig) -> Self {
        Self::new(credentials, config.leeway_seconds)
    }

    /// Verify `token` and decode its claims.
    pub async fn verify(&self, token: &str) -> Result<AuthContext, AuthError> {
        let secret =
            self.credentials.signing_secret().await.map_err(AuthError::SigningSecretUnavailable)?;
        let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());
        let data = decode::<Map<String, Value>>(token, &key, &self.validation)?;
        Ok(AuthContext::new(data.claims))
    }
}
