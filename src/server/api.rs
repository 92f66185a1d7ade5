//! Router construction and server lifecycle.

use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::server::{handlers, AppState, Result, ServerConfig, ServerError};

/// Build the application router.
///
/// Routes:
/// - `GET /health` - liveness and store counts
/// - `POST /{category}` - producer write, category one of batch/epoch/train
/// - `GET /{category}/{run_id}` - live feed subscription
///
/// Any other path falls through to the static chart UI when a static
/// directory is configured.
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/{category}", post(handlers::ingest))
        .route("/{category}/{run_id}", get(handlers::subscribe))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match &config.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

/// The monitoring server: one [`AppState`] wired to an axum router.
pub struct MonitorServer {
    config: ServerConfig,
}

impl MonitorServer {
    /// Create a server from configuration.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Bind and serve until the process is stopped.
    pub async fn run(self) -> Result<()> {
        let state = AppState::new(self.config.limits);
        let app = create_router(state, &self.config);

        let listener = tokio::net::TcpListener::bind(self.config.address)
            .await
            .map_err(|e| ServerError::Bind(format!("{}: {e}", self.config.address)))?;
        tracing::info!("listening on http://{}", self.config.address);
        if let Some(dir) = &self.config.static_dir {
            tracing::info!("serving static assets from {}", dir.display());
        }

        axum::serve(listener, app).await?;
        Ok(())
    }
}
