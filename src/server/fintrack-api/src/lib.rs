//! # Fintrack API
//!
//! REST layer for Fintrack.
//!
//! ## Endpoints
//!
//! - `POST /api/auth/register` - Create an identity and receive a token
//! - `POST /api/auth/login` - Exchange credentials for a token
//! - `GET /api/auth/me` - Current principal (requires a bearer token)
//! - `GET /health` - Liveness check
//!
//! Every request passes through the authentication gate first.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use fintrack_auth::{AuthService, AuthenticationGate, CredentialStore, TokenService};

pub use error::ApiError;
pub use middleware::Authenticated;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Login and registration.
    pub auth: Arc<AuthService>,
    /// Per-request authentication gate.
    pub gate: Arc<AuthenticationGate>,
}

impl AppState {
    /// Wires the auth service and gate over one token service and store.
    pub fn new(tokens: Arc<TokenService>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            auth: Arc::new(AuthService::new(tokens.clone(), store.clone())),
            gate: Arc::new(AuthenticationGate::new(tokens, store)),
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/me", get(handlers::me))
        .fallback(handlers::not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::authentication_gate,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
