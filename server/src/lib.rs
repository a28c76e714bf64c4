//! HTTP front end of the intake ledger.
//!
//! # Routes
//! - `POST /api/submit`: validate a survey submission, stamp the date, append it
//! - `GET /api/customers`: every record, optionally filtered with `?q=` and
//!   reduced with `?view=summary`
//! - `GET /api/customers/{id}`: one record by positional id
//! - `GET /health`: liveness check
//!
//! Errors are JSON `{"error": "..."}`: bad input is 400, a missing record 404,
//! and an unreachable spreadsheet 503.
//!
//! # Credentials
//! A request's `Authorization: Bearer <token>` header is forwarded to the
//! spreadsheet. Without one, the credential from `INTAKE_ACCESS_TOKEN` or
//! `INTAKE_API_KEY` is used.
//!
//! # Logging
//! Controlled with `RUST_LOG`, e.g. `RUST_LOG=intake_ledger_server=debug`.
use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use intake_ledger_core::Credential;
use intake_ledger_sheets::SheetsSource;
use intake_ledger_store::{IntakeConfig, RecordStore, TabularSource};
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod error;
pub mod routes;
pub mod state;

use error::ServerError;
use routes::{get_handler, health_handler, list_handler, submit_handler};
use state::AppState;

/// Builds the application router over any source.
pub fn router<S: TabularSource + 'static>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/submit", post(submit_handler::<S>))
        .route("/api/customers", get(list_handler::<S>))
        .route("/api/customers/{id}", get(get_handler::<S>))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

/// Installs the global `tracing` subscriber, filtered by `RUST_LOG`
/// (`info` when unset). Later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// Serves the Google Sheets backed API described by `config` until Ctrl+C
/// or SIGTERM.
pub async fn start_server(
    config: &IntakeConfig,
    credential: Option<Credential>,
) -> Result<(), ServerError> {
    info!("Initializing state...");
    let spreadsheet_id = config.spreadsheet_id()?;
    let schema = config.resolve_schema()?;
    let source = SheetsSource::from_config(&config.source)?;
    info!("Using spreadsheet {spreadsheet_id} with schema {}", schema.version);

    if credential.is_none() {
        warn!("No default credential set, requests must carry a bearer token");
    }

    let store = RecordStore::new(source, schema, config.source.sheet.as_deref());
    let state = Arc::new(AppState::new(store, credential));

    serve(state, &config.server.bind, config.server.port).await
}

/// Binds `bind:port` and serves `state` until shutdown.
pub async fn serve<S: TabularSource + 'static>(
    state: Arc<AppState<S>>,
    bind: &str,
    port: u16,
) -> Result<(), ServerError> {
    let address = format!("{bind}:{port}");
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    let local: SocketAddr = listener.local_addr()?;
    info!("Server running on {local}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
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
}
