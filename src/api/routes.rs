use axum::{
    extract::{Extension, State},
    middleware,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::error::ApiError;
use crate::auth::{authenticate, AuthContext, AuthState};
use crate::storage::{ConnectionManager, ConnectionState, Connector};

pub struct AppState<C: Connector> {
    pub service: String,
    pub connections: ConnectionManager<C>,
    pub auth: AuthState,
}

impl<C: Connector> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            connections: self.connections.clone(),
            auth: self.auth.clone(),
        }
    }
}

impl<C: Connector> AppState<C> {
    pub fn new(service: impl Into<String>, connections: ConnectionManager<C>, auth: AuthState) -> Self {
        Self { service: service.into(), connections, auth }
    }
}

#[derive(Debug, Serialize)]
struct HealthBody {
    service: String,
    database: &'static str,
}

/// `/health` is public; everything under `/api` requires a bearer token.
pub fn build_router<C: Connector>(state: AppState<C>) -> Router {
    let auth_layer = middleware::from_fn_with_state(state.auth.clone(), authenticate);

    let secured_api =
        Router::new().route("/api/session", get(session_handler)).route_layer(auth_layer);

    Router::new()
        .route("/health", get(health_handler::<C>))
        .with_state(state)
        .merge(secured_api)
}

/// `200` only while connected and the liveness check passes.
async fn health_handler<C: Connector>(
    State(state): State<AppState<C>>,
) -> Result<Json<HealthBody>, ApiError> {
    let database = state.connections.state();
    if database != ConnectionState::Connected {
        return Err(ApiError::service_unavailable(format!("Database {}", database)));
    }
    state.connections.ping().await?;

    Ok(Json(HealthBody { service: state.service.clone(), database: database.as_str() }))
}

async fn session_handler(Extension(context): Extension<AuthContext>) -> Json<AuthContext> {
    Json(context)
}
