//! API server and ingestion scheduler.

use std::sync::Arc;

use anyhow::{Context, Result};
use jobboard_core::domains::companies::build_enricher;
use jobboard_core::domains::schedules::PgScheduleStore;
use jobboard_core::domains::source::ingestors::{build_sources, SourceHttp};
use jobboard_core::kernel::{build_http_client, IngestionScheduler, ResponseCache, ServerDeps};
use jobboard_core::server::{build_app, ApiKeys};
use jobboard_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,jobboard_core=debug,sqlx=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Go Jobs Nigeria server");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(mode = ?config.mode, enrichment = ?config.enrichment, "Configuration loaded");

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    let http = SourceHttp::new(
        build_http_client(config.http_timeout)?,
        config.retry,
        ResponseCache::new(config.response_cache_dir.clone()),
    );
    let sources = build_sources(&config, http);
    let enricher = build_enricher(&config, pool.clone())?;
    let store = Arc::new(PgScheduleStore::new(pool.clone()));
    let deps = ServerDeps::new(pool, sources, enricher, store, config.sync_timeout);

    let scheduler = IngestionScheduler::new(deps.clone()).await?;
    scheduler
        .start(&config.scheduled_sources)
        .await
        .context("Failed to start scheduler")?;

    let app = build_app(
        deps,
        ApiKeys::new(&config.api_key, &config.cron_api_key),
        &config.allowed_origins,
    );

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    scheduler.shutdown().await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
