//! # homestay-api: Binary Entry Point
//!
//! Starts the Axum HTTP server. Configuration comes from `PORT`,
//! `AUTH_TOKEN`, `GST_RATE_PERCENT`, and the optional `DATABASE_URL`.

use homestay_api::state::{AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("invalid configuration: {e}");
        e
    })?;
    let port = config.port;
    tracing::info!(?config, "configuration loaded");

    // Absent DATABASE_URL means in-memory only.
    let db_pool = homestay_api::db::init_pool().await.map_err(|e| {
        tracing::error!("database initialization failed: {e}");
        e
    })?;

    let state = AppState::with_config(config, db_pool);
    state.hydrate_from_db().await.map_err(|e| {
        tracing::error!("database hydration failed: {e}");
        e
    })?;

    let app = homestay_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("homestay API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
