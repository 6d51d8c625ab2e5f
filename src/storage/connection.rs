//! # Connection Manager
//!
//! Owns the service's single database handle and the state machine around it:
//!
//! ```text
//!  Disconnected ──connect()──> Connecting ──ok──> Connected
//!       ^                        │   ^                │
//!       │                       err  └─retry (Retry)──┤ connection_lost()
//!       │                        v                    v
//!       └──── disconnect() ── Failed            Disconnected
//! ```
//!
//! Only connection attempts and driver callbacks move the state. What happens
//! on failure is an explicit [`FailurePolicy`]: terminate the process (unless
//! running in [`Environment::Test`]) or retry with bounded exponential backoff.
//! A successful connection never schedules a retry.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::pool::{redact_uri, uri_host};
use crate::config::{Environment, FailurePolicy, GuardConfig, RetryConfig};
use crate::errors::{Error, Result};
use crate::secrets::CredentialProvider;

/// Database driver seam.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Live handle handed to the rest of the service.
    type Connection: Clone + Send + Sync + 'static;

    /// Dial `uri`. Errors must not contain the raw URI.
    async fn connect(&self, uri: &str) -> Result<Self::Connection>;

    /// Release a handle.
    async fn close(&self, connection: Self::Connection);

    /// Liveness check on a live handle.
    async fn ping(&self, _connection: &Self::Connection) -> Result<()> {
        Ok(())
    }
}

/// Lifecycle of the managed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings the manager needs from [`GuardConfig`].
#[derive(Debug, Clone)]
pub struct ConnectionPolicy {
    pub service: String,
    pub failure_policy: FailurePolicy,
    pub retry: RetryConfig,
    pub environment: Environment,
}

impl ConnectionPolicy {
    pub fn from_config(config: &GuardConfig) -> Self {
        Self {
            service: config.service.name.clone(),
            failure_policy: config.database.failure_policy,
            retry: config.database.retry.clone(),
            environment: config.environment,
        }
    }
}

struct Slot<T> {
    state: ConnectionState,
    connection: Option<T>,
    retry_task: Option<JoinHandle<()>>,
    retry_attempts: u32,
    // Bumped by disconnect() so in-flight attempts know they are stale.
    generation: u64,
}

struct Inner<C: Connector> {
    connector: C,
    credentials: Arc<CredentialProvider>,
    policy: ConnectionPolicy,
    slot: Mutex<Slot<C::Connection>>,
}

/// Cheaply cloneable handle to the service's database connection.
///
/// Construct one at startup and pass it to whatever needs the database.
pub struct ConnectionManager<C: Connector> {
    inner: Arc<Inner<C>>,
}

impl<C: Connector> Clone for ConnectionManager<C> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C, credentials: Arc<CredentialProvider>, policy: ConnectionPolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                connector,
                credentials,
                policy,
                slot: Mutex::new(Slot {
                    state: ConnectionState::Disconnected,
                    connection: None,
                    retry_task: None,
                    retry_attempts: 0,
                    generation: 0,
                }),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<C::Connection>> {
        self.inner.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> ConnectionState {
        self.lock().state
    }

    /// The live handle, if connected.
    pub fn connection(&self) -> Option<C::Connection> {
        self.lock().connection.clone()
    }

    /// Retries scheduled since the last successful connection.
    pub fn retry_attempts(&self) -> u32 {
        self.lock().retry_attempts
    }

    /// Establish the connection. Idempotent and safe to call concurrently.
    ///
    /// Returns `Ok(())` when connected, when another caller's attempt is in
    /// flight, or when the retry policy took over a failure. With the exit
    /// policy a failure terminates the process; in test mode it returns
    /// the error instead.
    pub async fn connect(&self) -> Result<()> {
        let generation = {
            let mut slot = self.lock();
            match slot.state {
                ConnectionState::Connected | ConnectionState::Connecting => {
                    debug!(
                        service = %self.inner.policy.service,
                        state = %slot.state,
                        "Database already connected or connecting"
                    );
                    return Ok(());
                }
                ConnectionState::Disconnected | ConnectionState::Failed => {
                    slot.state = ConnectionState::Connecting;
                    slot.generation
                }
            }
        };

        match self.attempt(generation).await {
            Ok(()) => Ok(()),
            Err(error) => self.handle_failure(error, generation),
        }
    }

    /// The live connection went away.
    ///
    /// [`ConnectionManager::ping`] calls this when the liveness check fails.
    /// An embedding service whose driver reports drops calls it directly.
    /// Must be called from within a Tokio runtime when the retry policy is
    /// active.
    pub fn connection_lost(&self) {
        let mut slot = self.lock();
        if slot.state != ConnectionState::Connected {
            return;
        }

        slot.connection = None;
        slot.state = ConnectionState::Disconnected;
        warn!(service = %self.inner.policy.service, "Database connection lost");

        if self.inner.policy.failure_policy == FailurePolicy::Retry {
            slot.retry_attempts = 0;
            self.schedule_retry(&mut slot);
        }
    }

    /// Check the live connection with [`Connector::ping`].
    ///
    /// A failed check moves the manager through [`Self::connection_lost`].
    /// No-op without a live connection.
    pub async fn ping(&self) -> Result<()> {
        let Some(connection) = self.connection() else {
            return Ok(());
        };

        if let Err(error) = self.inner.connector.ping(&connection).await {
            warn!(service = %self.inner.policy.service, error = %error, "Database liveness check failed");
            self.connection_lost();
            return Err(error);
        }
        Ok(())
    }

    /// Cancel pending retries, close the handle and return to `Disconnected`.
    pub async fn disconnect(&self) {
        let (connection, retry_task) = {
            let mut slot = self.lock();
            slot.generation += 1;
            slot.state = ConnectionState::Disconnected;
            slot.retry_attempts = 0;
            (slot.connection.take(), slot.retry_task.take())
        };

        if let Some(task) = retry_task {
            task.abort();
        }
        if let Some(connection) = connection {
            self.inner.connector.close(connection).await;
            info!(service = %self.inner.policy.service, "Database disconnected");
        }
    }

    async fn attempt(&self, generation: u64) -> Result<()> {
        let uri = self.inner.credentials.connection_uri().await?;
        let redacted = redact_uri(uri.expose_secret());
        let connection = self.inner.connector.connect(uri.expose_secret()).await?;

        {
            let mut slot = self.lock();
            if slot.generation == generation {
                slot.state = ConnectionState::Connected;
                slot.connection = Some(connection);
                slot.retry_attempts = 0;
                info!(
                    service = %self.inner.policy.service,
                    host = %uri_host(uri.expose_secret()),
                    uri = %redacted,
                    "Database connected"
                );
                return Ok(());
            }
        }

        debug!(service = %self.inner.policy.service, "Discarding connection opened after disconnect");
        self.inner.connector.close(connection).await;
        Ok(())
    }

    fn handle_failure(&self, error: Error, generation: u64) -> Result<()> {
        let mut slot = self.lock();
        if slot.generation != generation {
            return Ok(());
        }
        slot.state = ConnectionState::Failed;

        match self.inner.policy.failure_policy {
            FailurePolicy::Exit => {
                drop(slot);
                error!(
                    service = %self.inner.policy.service,
                    error = %error,
                    "Fatal: database connection failed"
                );
                if self.inner.policy.environment.is_test() {
                    return Err(error);
                }
                std::process::exit(1);
            }
            FailurePolicy::Retry => {
                error!(
                    service = %self.inner.policy.service,
                    error = %error,
                    retryable = error.is_retryable(),
                    "Database connection failed"
                );
                self.schedule_retry(&mut slot);
                Ok(())
            }
        }
    }

    fn schedule_retry(&self, slot: &mut Slot<C::Connection>) {
        let retry = &self.inner.policy.retry;
        if !retry.allows(slot.retry_attempts) {
            error!(
                service = %self.inner.policy.service,
                attempts = slot.retry_attempts,
                "Giving up on database reconnection"
            );
            return;
        }

        slot.retry_attempts += 1;
        let attempt = slot.retry_attempts;
        let delay = retry.delay_for(attempt);
        let generation = slot.generation;
        warn!(
            service = %self.inner.policy.service,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "Scheduling database reconnection"
        );

        let manager = self.clone();
        if let Some(previous) = slot.retry_task.replace(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            manager.retry(generation).await;
        })) {
            previous.abort();
        }
    }

    async fn retry(&self, generation: u64) {
        {
            let mut slot = self.lock();
            let idle = matches!(slot.state, ConnectionState::Failed | ConnectionState::Disconnected);
            if slot.generation != generation || !idle {
                return;
            }
            slot.state = ConnectionState::Connecting;
        }

        if let Err(error) = self.attempt(generation).await {
            // The retry policy never returns an error from here.
            let _ = self.handle_failure(error, generation);
        }
    }
}
