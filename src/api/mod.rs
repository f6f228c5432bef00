//! REST API wrapping the expansion engine.
//!
//! Every request carries its own cycle config and runs its own expansion;
//! the shared state holds only the default engine settings.
//!
//! - `GET /health`
//! - `POST /preview`: `{ time, current, warnings }`
//! - `POST /periods?granularity=`: period windows of the horizon
//! - `POST /slice?granularity=&period=`: one period, rebased to zero
//! - `POST /validate`: config problems and rule overlaps

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::config::EngineConfig;

pub use types::{
    ErrorResponse, HealthResponse, PeriodQuery, PreviewRequest, ProblemRecord, SliceResponse,
    ValidationResponse,
};

/// Immutable application state shared across all request handlers.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Settings applied when a request does not override them.
    pub settings: EngineConfig,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/preview", post(handlers::preview))
        .route("/periods", post(handlers::periods))
        .route("/slice", post(handlers::slice))
        .route("/validate", post(handlers::validate))
        .with_state(state)
}

/// Binds to the given address and serves the API until the server stops.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
