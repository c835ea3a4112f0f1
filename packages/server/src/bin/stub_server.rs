//! Local vendor stub for dev mode.

use anyhow::{Context, Result};
use jobboard_core::server::stub_router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let port: u16 = match std::env::var("STUB_PORT") {
        Ok(raw) => raw.parse().context("STUB_PORT must be a valid number")?,
        Err(_) => 8081,
    };

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Vendor stub listening on {}", addr);

    axum::serve(listener, stub_router())
        .await
        .context("Stub server error")?;
    Ok(())
}
