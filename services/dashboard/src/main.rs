//! vtrack dashboard service
//!
//! Single-binary local service that:
//! 1. Drives the Spotify Authorization Code + PKCE login
//! 2. Persists the session across restarts in a 0600 JSON file
//! 3. Serves listening-stats panels (top artists/tracks/albums, genres,
//!    summary, recently played) as JSON

mod config;
mod routes;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spotify_auth::SessionStore;

use crate::config::Config;
use crate::routes::{AppState, build_router};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting vtrack-dashboard");

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        listen_addr = %config.server.listen_addr,
        redirect_uri = %config.spotify.redirect_uri,
        session_file = %config.server.session_file.display(),
        "configuration loaded"
    );

    let store = SessionStore::load(config.server.session_file.clone())
        .await
        .context("failed to load session store")?;

    let state = AppState {
        store: Arc::new(store),
        app: Arc::new(config.oauth_app()),
        http: reqwest::Client::new(),
        api_base: spotify_stats::SPOTIFY_API_BASE.to_string(),
        started_at: Instant::now(),
    };

    let app = build_router(state);

    let listener = TcpListener::bind(config.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.server.listen_addr))?;

    info!(addr = %config.server.listen_addr, "accepting requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
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
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
