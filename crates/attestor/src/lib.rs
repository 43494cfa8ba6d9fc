//! Firechat attestor backend
//!
//! A stateless HTTP service that verifies bearer tokens presented by chat
//! clients and exposes a small set of account administration endpoints. It
//! holds no persistent state of its own; the platform's identity service is
//! the source of truth and is reached through [`admin::AdminDirectory`].

pub mod admin;
pub mod config;
pub mod error;
pub mod routes;
pub mod tokens;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::trace::TraceLayer;

use crate::admin::AdminDirectory;
use crate::tokens::TokenKeys;

#[derive(Clone)]
pub struct AppState {
    pub admin: AdminDirectory,
    pub keys: TokenKeys,
}

/// Build the attestor router with all API routes wired up
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/verify-token", post(routes::verify_token))
        .route("/api/create-custom-token", post(routes::create_custom_token))
        .route("/api/get-user-by-phone", post(routes::get_user_by_phone))
        .route("/api/revoke-tokens", post(routes::revoke_tokens))
        .route("/api/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}
