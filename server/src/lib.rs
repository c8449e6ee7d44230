//! Filament Tracker Backend
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - repository: Data access abstractions and implementations
//! - api: axum handlers, error mapping and the router
//! - config: Command-line and environment configuration

pub mod api;
pub mod config;
pub mod domain;
pub mod repository;

use anyhow::Context;
use tokio::net::TcpListener;

use api::{build_app, AppState};
use config::Config;
use repository::{init_db, DbState};

/// Open the database, serve until a shutdown signal, then close the database
pub async fn run(config: Config) -> anyhow::Result<()> {
    let db_state = init_db(&config.database)
        .await
        .with_context(|| format!("failed to open database at {}", config.database.display()))?;

    let app = build_app(AppState::new(db_state.clone()), &config);

    let addr = config.socket_addr().context("invalid listen address")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    log::info!("Filament tracker listening on http://{}", addr);
    if let Some(dir) = &config.static_dir {
        log::info!("Serving UI from {}", dir.display());
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(db_state))
        .await
        .context("server error")?;

    log::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM, after closing the database
async fn shutdown_signal(db_state: DbState) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
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
                log::error!("Failed to listen for SIGTERM: {}", e);
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

    log::info!("Shutting down");
    if let Err(e) = db_state.close().await {
        log::error!("Error closing database: {}", e);
    }
}
