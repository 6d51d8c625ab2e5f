//! Axum middleware for bearer token authentication.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::{error, field, info_span, warn, Instrument};

use crate::api::error::ApiError;
use crate::auth::jwt::TokenVerifier;
use crate::auth::models::AuthError;
use crate::config::Locale;

/// Shared state for [`authenticate`].
#[derive(Clone)]
pub struct AuthState {
    verifier: Arc<TokenVerifier>,
    locale: Locale,
}

impl AuthState {
    pub fn new(verifier: Arc<TokenVerifier>, locale: Locale) -> Self {
        Self { verifier, locale }
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }
}

/// Middleware entry point that authenticates requests with a bearer token.
///
/// Applies to every method. CORS preflight handling belongs in a layer in
/// front of this one.
///
/// On success the decoded [`AuthContext`](crate::auth::AuthContext) is
/// inserted into the request extensions before the next stage runs.
pub async fn authenticate(
    State(state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let correlation_id = uuid::Uuid::new_v4();
    let span = info_span!(
        "auth_middleware.authenticate",
        http.method = %request.method(),
        http.path = %request.uri().path(),
        auth.sub = field::Empty,
        correlation_id = %correlation_id
    );

    async move {
        let verified = match bearer_token(request.headers()) {
            Ok(token) => state.verifier.verify(token).await,
            Err(err) => Err(err),
        };

        match verified {
            Ok(context) => {
                if let Some(sub) = context.sub() {
                    tracing::Span::current().record("auth.sub", sub);
                }
                request.extensions_mut().insert(context);
                Ok(next.run(request).await)
            }
            Err(err) => {
                if err.is_misconfiguration() {
                    error!(%correlation_id, code = err.code(), error = %err, "token verification aborted");
                } else {
                    warn!(%correlation_id, code = err.code(), error = %err, "authentication failed");
                }
                Err(ApiError::rejected(err.rejection(), state.locale))
            }
        }
    }
    .instrument(span)
    .await
}

/// Extract the token from the `Authorization` header.
///
/// The token is the second whitespace-delimited segment; the scheme word
/// itself is not checked.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::MissingHeader)?;
    let value = value.to_str().map_err(|_| AuthError::MalformedToken)?;
    if value.trim().is_empty() {
        return Err(AuthError::MissingHeader);
    }

    value.split_whitespace().nth(1).ok_or(AuthError::MalformedToken)
}
