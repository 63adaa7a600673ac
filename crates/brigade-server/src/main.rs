//! Brigade Server — application entry point.

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use brigade_db::DbManager;
use brigade_server::{AppState, ServerArgs, build_router};
use clap::Parser;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("brigade=info")),
        )
        .json()
        .init();

    let config = ServerArgs::parse().load()?;
    info!(bind = %config.bind, db_url = %config.db.url, "Starting Brigade server");

    let db = DbManager::connect(&config.db)
        .await
        .context("connecting to SurrealDB")?;
    db.migrate().await.context("running schema migrations")?;

    let state = AppState::new(db.client().clone(), config.auth, config.chart);
    let mut app = build_router(state);
    if let Some(origin) = &config.cors_origin {
        let origin: HeaderValue = origin.parse().context("parsing CORS origin")?;
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    info!(addr = %config.bind, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Brigade server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
