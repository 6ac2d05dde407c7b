//! Atelier Server — AI-Assisted Code Workspace Backend
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use atelier_core::config::AppConfig;
use atelier_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("ATELIER_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Atelier v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db = atelier_database::connection::DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    atelier_database::migration::run_migrations(db.pool()).await?;
    tracing::info!("Database migrations complete");

    // ── Step 2: Stores ───────────────────────────────────────────
    let node_store = Arc::new(atelier_database::postgres::PgNodeStore::new(
        db.pool().clone(),
        config.vfs.max_depth,
    ));
    let share_store = Arc::new(atelier_database::postgres::PgShareStore::new(
        db.pool().clone(),
    ));

    // ── Step 3: Services ─────────────────────────────────────────
    let node_service = Arc::new(atelier_service::node::NodeService::new(
        node_store.clone(),
        config.vfs.clone(),
    ));
    let path_service = Arc::new(atelier_service::node::PathService::new(node_store.clone()));
    let share_service = Arc::new(atelier_service::share::ShareService::new(
        node_store.clone(),
        share_store.clone(),
        config.vfs.clone(),
    ));
    let access_service = Arc::new(atelier_service::share::AccessService::new(
        node_store,
        share_store,
    ));
    tracing::info!("Services initialized");

    // ── Step 4: Build and start HTTP server ──────────────────────
    let app_state = atelier_api::AppState {
        config: Arc::new(config.clone()),
        db_pool: db.pool().clone(),
        node_service,
        path_service,
        share_service,
        access_service,
    };

    let app = atelier_api::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Atelier server listening on {}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    db.close().await;
    tracing::info!("Atelier server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
