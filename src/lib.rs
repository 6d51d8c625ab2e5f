//! # Service Guard
//!
//! Shared bootstrap for a fleet of small HTTP services: credential lookup
//! from mounted secrets with an environment fallback, a supervised database
//! connection, and bearer token authentication for protected routes.
//!
//! ## Architecture
//!
//! ```text
//! /run/secrets/<name> ─┐
//!                      ├─► SecretResolver ─► CredentialProvider ─┬─► ConnectionManager ─► PgPool
//! environment ─────────┘                                         └─► TokenVerifier ─► authenticate
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use service_guard::{
//!     config::GuardConfig,
//!     secrets::CredentialProvider,
//!     storage::{ConnectionManager, ConnectionPolicy, PgConnector},
//!     Result,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = GuardConfig::from_env()?;
//!     let credentials = Arc::new(CredentialProvider::from_config(&config));
//!     let connections = ConnectionManager::new(
//!         PgConnector::from_config(&config.database),
//!         credentials,
//!         ConnectionPolicy::from_config(&config),
//!     );
//!     connections.connect().await
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod observability;
pub mod secrets;
pub mod storage;

// Re-export commonly used types and traits
pub use config::{Environment, GuardConfig};
pub use errors::{Error, Result};
pub use observability::init_logging;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
