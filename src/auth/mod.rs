//! Bearer token authentication.
//!
//! [`middleware::authenticate`] guards protected routes: it extracts the
//! token from the `Authorization` header, verifies it with the
//! [`TokenVerifier`] against the signing secret, and attaches the decoded
//! [`AuthContext`] to the request.

pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::TokenVerifier;
pub use middleware::{authenticate, bearer_token, AuthState};
pub use models::{AuthContext, AuthError, Rejection};
