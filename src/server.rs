//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache spawning, Axum server lifecycle, and
//! the shutdown sequence that flushes pending visit counts before exit.

use crate::cache::{CacheSettings, ResolverCache};
use crate::config::Config;
use crate::domain::repositories::{LinkRepository, UserRepository};
use crate::infrastructure::LinkResolutionStore;
use crate::infrastructure::persistence::{PgLinkRepository, PgUserRepository};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::codec::Codec;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool (settings from config)
/// - Migrations
/// - Resolution cache coordinator (when enabled)
/// - Axum HTTP server with graceful shutdown
///
/// On SIGINT/SIGTERM the listener drains, then the resolution cache is
/// closed, which performs the final flush of pending visit counts before
/// the pool is dropped.
///
/// # Errors
///
/// Returns an error if the database connection, migrations, bind, or the
/// server runtime fail.
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate")?;

    let pool = Arc::new(pool);
    let links: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(pool.clone()));
    let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));
    let codec = Arc::new(Codec::new(&config.codec_alphabet)?);

    let cache = if config.use_cache {
        let store = Arc::new(LinkResolutionStore::new(codec.clone(), links.clone()));
        let cache = ResolverCache::spawn(
            store,
            CacheSettings {
                capacity: config.cache_capacity,
                sync_interval: Duration::from_secs(config.cache_sync_interval),
            },
        );
        tracing::info!("Resolution cache started");
        Some(cache)
    } else {
        tracing::info!("Resolution cache disabled");
        None
    };

    let state = AppState::new(
        links,
        users,
        cache.clone(),
        codec,
        config.base_url.clone(),
        config.home_redirect.clone(),
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The listener has drained; push the remaining visit counts out before
    // the pool goes away.
    if let Some(cache) = cache {
        match cache.close().await {
            Ok(report) => tracing::info!(
                flushed = report.flushed,
                failed = report.failed,
                "final cache flush complete"
            ),
            Err(e) => tracing::warn!("final cache flush skipped: {e}"),
        }
    }

    Ok(())
}

/// Completes when the process receives SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
