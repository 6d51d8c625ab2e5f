//! Secret resolution for service configuration.
//!
//! Sensitive configuration (the token signing secret, database URIs) is read
//! from a mounted secret store first and from the process environment second.
//!
//! # Architecture
//!
//! ```text
//! CredentialProvider ──> SecretResolver ──> MountedSecretStore (/run/secrets/<name>)
//!   (non-empty or            (tiers in            │ on failure: warn!
//!    MissingCredential)       order)              └─> EnvSecretSource (<NAME>)
//! ```
//!
//! - [`SecretResolver::resolve`] never fails; an exhausted chain yields a
//!   secret with [`SecretOrigin::Absent`].
//! - [`CredentialProvider::require_credential`] turns absence into
//!   [`SecretsError::MissingCredential`].
//!
//! # Security Considerations
//!
//! - Secret values are held in [`SecretString`] and never logged
//! - Errors carry secret names, never values
//! - Tier fallbacks are logged as warnings so broken mounts are visible

pub mod credentials;
pub mod env;
pub mod error;
pub mod mounted;
pub mod resolver;
pub mod source;
pub mod types;

pub use credentials::CredentialProvider;
pub use env::EnvSecretSource;
pub use error::{Result, SecretsError};
pub use mounted::{MountedSecretStore, DEFAULT_SECRETS_DIR};
pub use resolver::SecretResolver;
pub use source::SecretSource;
pub use types::{Credential, Secret, SecretKey, SecretOrigin, SecretString};
