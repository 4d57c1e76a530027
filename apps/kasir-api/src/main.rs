//! # Kasir API Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Kasir API Server                               │
//! │                                                                         │
//! │  Client ───► HTTP (5000) ───► Handlers ───► kasir-db ───► SQLite       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Context;
use kasir_api::telemetry::init_tracing;
use kasir_api::{build_router, ApiConfig, AppState};
use kasir_db::Database;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::load().context("loading configuration")?;
    init_tracing(&config.log_filter);

    info!(
        port = config.port,
        database = %config.database_path,
        allow_underpayment = config.allow_underpayment,
        "Starting Kasir API server..."
    );

    let db = Database::new(config.db_config())
        .await
        .context("opening database")?;
    info!("Database ready, migrations applied");

    let state = AppState::new(db.clone(), config.checkout_settings());
    let app = build_router(state);

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
                error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
