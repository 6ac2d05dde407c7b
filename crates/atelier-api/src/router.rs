//! Route definitions for the Atelier HTTP API.
//!
//! Authenticated routes are mounted under `/api`; the public share
//! viewer lives at the root so share URLs stay short. The router
//! receives `AppState` and passes it to all handlers via Axum's `State`
//! extractor.

use axum::http::HeaderValue;
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(node_routes())
        .merge(share_routes())
        .merge(health_routes());

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .merge(public_routes())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Node CRUD and path resolution.
fn node_routes() -> Router<AppState> {
    Router::new()
        .route("/nodes", get(handlers::node::list_nodes))
        .route("/nodes", post(handlers::node::create_node))
        .route("/nodes/{id}", get(handlers::node::get_node))
        .route("/nodes/{id}", put(handlers::node::update_node))
        .route("/nodes/{id}", delete(handlers::node::delete_node))
        .route("/nodes/{id}/path", get(handlers::node::get_node_path))
}

/// Share management.
fn share_routes() -> Router<AppState> {
    Router::new()
        .route("/shares", get(handlers::share::list_shares))
        .route("/shares", post(handlers::share::create_share))
        .route("/shares/{id}", delete(handlers::share::revoke_share))
}

/// Public share viewer.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/share/{token}", get(handlers::public::view_share))
        .route(
            "/share/{token}/{node_id}",
            get(handlers::public::view_share_node),
        )
}

/// Health probes.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// CORS policy from configuration. No configured origins means no
/// cross-origin access.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = state
        .config
        .server
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::new()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
