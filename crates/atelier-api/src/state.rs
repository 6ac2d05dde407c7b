//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use atelier_core::config::AppConfig;
use atelier_service::node::{NodeService, PathService};
use atelier_service::share::{AccessService, ShareService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool (health checks).
    pub db_pool: PgPool,
    /// Node CRUD service.
    pub node_service: Arc<NodeService>,
    /// Path resolution service.
    pub path_service: Arc<PathService>,
    /// Share management service.
    pub share_service: Arc<ShareService>,
    /// Public share access service.
    pub access_service: Arc<AccessService>,
}
