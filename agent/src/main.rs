//! Igloo Host Agent
//!
//! This agent runs on a managed host and executes shell commands
//! submitted over HTTP by the Igloo dashboard.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod domain;
mod error;
mod handlers;

pub use config::Config;
pub use error::{Error, Result};

use handlers::process::{CommandExecutor, ShellRunner};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub executor: Arc<dyn CommandExecutor>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Arc::new(Config::load()?);
    let http_addr: SocketAddr = format!("{}:{}", config.http_host, config.http_port).parse()?;

    info!("Starting Igloo Agent");
    info!("HTTP listening on {}", http_addr);
    info!("Commands run with: {} -c <command>", config.shell);
    match config.command_deadline() {
        Some(deadline) => info!("Command deadline: {:?}", deadline),
        None => warn!("Command deadline disabled, hung commands block their request forever"),
    }
    if config.auth_token.is_none() {
        warn!("No auth token configured, any reachable client can run commands");
    }

    let state = AppState {
        executor: Arc::new(ShellRunner::from_config(&config)),
        config: config.clone(),
    };

    let app = api::http::create_router(state);

    axum::serve(tokio::net::TcpListener::bind(http_addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Agent shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    info!("Received shutdown signal");
}
