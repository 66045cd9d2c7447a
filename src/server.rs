//! HTTP server initialization and runtime setup.
//!
//! Handles store selection, database connections, and Axum server lifecycle.

use crate::config::{Config, StoreBackend};
use crate::domain::repositories::UrlStore;
use crate::infrastructure::persistence::{MemoryUrlStore, PgUrlStore};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Opens the PostgreSQL pool and applies migrations.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub async fn connect_database(config: &Config, database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to apply migrations")?;
    tracing::info!("Database schema is up to date");

    Ok(pool)
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - The configured store (in-memory, or PostgreSQL with migrations)
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (store, pool): (Arc<dyn UrlStore>, Option<PgPool>) = match config.store_backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory store");
            (Arc::new(MemoryUrlStore::new()), None)
        }
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;
            let pool = connect_database(&config, database_url).await?;
            tracing::info!("Using postgres store");
            (Arc::new(PgUrlStore::new(Arc::new(pool.clone()))), Some(pool))
        }
    };

    let state = AppState::new(store, config.base_url.clone());
    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service(app),
    )
    .with_graceful_shutdown(shutdown_signal(Duration::from_secs(config.shutdown_timeout)))
    .await?;

    if let Some(pool) = pool {
        pool.close().await;
        tracing::info!("Database pool closed");
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
///
/// Once the signal arrives, in-flight requests get `grace` to finish before
/// the process exits.
async fn shutdown_signal(grace: Duration) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");

    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        tracing::warn!("Graceful shutdown timed out after {:?}, exiting", grace);
        std::process::exit(1);
    });
}
