//! # Cardfile API Server
//!
//! This is the main API server for Cardfile, a contact-management backend.
//! It exposes rate-limited CRUD, search, and upcoming-birthday endpoints over
//! a SQLite-backed contact store.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p cardfile-api
//! ```

use cardfile_api::app::{build_router, AppState};
use cardfile_api::config::Config;
use cardfile_shared::db::migrations::run_migrations;
use cardfile_shared::db::pool::{close_pool, create_pool, DatabaseConfig};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cardfile_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Cardfile API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let state = AppState::new(pool.clone(), config.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);

    // ConnectInfo gives the rate limiter a peer address to key buckets on.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    close_pool(pool).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
