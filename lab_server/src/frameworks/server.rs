// Framework bootstrap for the lab session server.

use crate::domain::ports::SessionStore;
use crate::frameworks::{config, db};
use crate::interface_adapters::marker_file::FileMarkerStore;
use crate::interface_adapters::routes::app;
use crate::interface_adapters::sqlite_store::SqliteSessionStore;
use crate::interface_adapters::state::{AppState, SystemClock};
use std::io::{Error, Result};
use std::sync::Arc;

fn init_runtime() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

// Serve the app on an already bound listener until a shutdown signal arrives.
pub async fn run(listener: tokio::net::TcpListener, state: AppState) -> Result<()> {
    let address = listener.local_addr()?;
    tracing::info!(%address, mode = %state.mode, "listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "server error");
        })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let mode = config::registration_mode().map_err(|e| {
        tracing::error!(error = %e, "invalid LAB_REGISTRATION_MODE");
        Error::other(e)
    })?;

    let database_url = config::database_url();
    let pool = db::connect_pool(&database_url).await.map_err(|e| {
        tracing::error!(%database_url, error = %e, "failed to open database");
        Error::other(e)
    })?;
    db::run_migrations(&pool).await.map_err(|e| {
        tracing::error!(error = %e, "failed to run migrations");
        Error::other(e)
    })?;
    let store = SqliteSessionStore::new(pool);

    let marker_path = config::marker_path();
    tracing::debug!(marker_path = %marker_path.display(), "session marker configured");

    let state = AppState {
        sessions: Arc::new(store.clone()) as Arc<dyn SessionStore>,
        marker: Arc::new(FileMarkerStore::new(marker_path)),
        clock: Arc::new(SystemClock),
        mode,
    };

    let address = config::http_addr();
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    let served = run(listener, state).await;
    store.close().await;
    tracing::info!("store closed");
    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
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
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
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
    tracing::info!("shutdown signal received");
}
