//! # Storage
//!
//! Database bootstrap for the embedding service: the [`ConnectionManager`]
//! state machine and the sqlx-backed [`PgConnector`].

pub mod connection;
pub mod pool;

pub use crate::config::DatabaseConfig;

pub use connection::{ConnectionManager, ConnectionPolicy, ConnectionState, Connector};
pub use pool::{redact_uri, uri_host, DbPool, PgConnector, CREDENTIAL_MASK};

use crate::errors::{Error, Result};

/// Check database connectivity
pub async fn check_connection(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1").fetch_one(pool).await.map_err(|e| Error::Database {
        source: e,
        context: "Database connectivity check failed".to_string(),
    })?;

    Ok(())
}
