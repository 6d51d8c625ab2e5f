use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use service_guard::{
    api::{build_router, AppState},
    auth::{AuthState, TokenVerifier},
    config::GuardConfig,
    observability::{init_logging, log_config_info},
    secrets::CredentialProvider,
    storage::{ConnectionManager, ConnectionPolicy, PgConnector},
    Result, APP_NAME, VERSION,
};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Secret-backed database bootstrap and bearer-token gateway for one service.
#[derive(Debug, Parser)]
#[command(name = "service-guard", version, about)]
struct Args {
    /// Service name; selects the `database_uri_<service>` secret
    #[arg(long)]
    service: Option<String>,

    /// Address the HTTP server listens on
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists; must happen before any config is read
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let args = Args::parse();

    let mut config = GuardConfig::from_env()?;
    if let Some(service) = args.service {
        config.service.name = service;
    }
    config.validate()?;

    init_logging(&config.observability)?;
    info!(app_name = APP_NAME, version = VERSION, "Starting service guard");
    log_config_info(&config);

    let credentials = Arc::new(CredentialProvider::from_config(&config));
    let connections = ConnectionManager::new(
        PgConnector::from_config(&config.database),
        credentials.clone(),
        ConnectionPolicy::from_config(&config),
    );
    connections.connect().await?;

    if let Err(e) = connections.ping().await {
        warn!(error = %e, "Database connectivity check failed after connect");
    }

    let verifier = Arc::new(TokenVerifier::from_config(credentials, &config.auth));
    let state = AppState::new(
        config.service.name.clone(),
        connections.clone(),
        AuthState::new(verifier, config.auth.locale),
    );
    let router = build_router(state).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(args.bind).await?;
    info!(address = %args.bind, service = %config.service.name, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                warn!(error = %e, "Shutdown listener failed");
            }
            info!("Shutdown signal received");
        })
        .await?;

    connections.disconnect().await;
    info!("Service guard stopped");
    Ok(())
}
