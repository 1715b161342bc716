//! HTTP surface of the gateway.

pub mod extract;
pub mod handlers;
pub mod response;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, InvalidHeaderValue};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::AuthService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
}

pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/tokens/renew_access", post(handlers::renew_access))
        .route("/whoami", get(handlers::whoami))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS policy for browser clients. An empty origin list allows any origin.
pub fn build_cors_layer(origins: &[String]) -> Result<CorsLayer, InvalidHeaderValue> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(3600));

    if origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }
    let origins = origins
        .iter()
        .map(|o| o.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(layer.allow_origin(origins))
}
