//! HTTP routes for the frontend.

use std::{path::Path, sync::Arc};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::{info, instrument};
use weather_core::{CombinedResponse, Config, CoordinateQuery, RelayError, WeatherRelay};

#[derive(Debug, Clone)]
pub struct AppState {
    relay: Arc<WeatherRelay>,
    port: u16,
}

impl AppState {
    pub fn new(relay: WeatherRelay, port: u16) -> Self {
        Self { relay: Arc::new(relay), port }
    }
}

/// `RelayError` rendered as a JSON response.
pub struct ApiError(RelayError);

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0.body())).into_response()
    }
}

pub fn router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/weather", get(weather))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let relay = WeatherRelay::from_config(&config)?;
    let app = router(AppState::new(relay, config.port), &config.static_dir);

    let addr = config.listen_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("Server running on port {}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
}

async fn status(State(state): State<AppState>) -> String {
    format!(
        "Weather relay running on port {}. The frontend is expected to be deployed separately.",
        state.port
    )
}

#[instrument(skip(state))]
async fn weather(
    State(state): State<AppState>,
    query: Result<Query<CoordinateQuery>, QueryRejection>,
) -> Result<Json<CombinedResponse>, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        tracing::warn!(error = %rejection, "unreadable weather query");
        RelayError::MissingParameter
    })?;
    let res = state.relay.lookup(&query).await.inspect_err(|e| {
        tracing::warn!(status = e.status_code(), error = %e, "weather lookup failed");
    })?;
    Ok(Json(res))
}
