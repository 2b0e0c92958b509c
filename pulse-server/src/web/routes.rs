//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::tfl::{PredictionSource, TflError};

use super::dto::*;
use super::state::AppState;
use super::ws::live_updates;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/status", get(status))
        .route("/api/trains", get(trains))
        .route("/api/predictions", get(predictions))
        .route("/api/victoria", get(predictions))
        .route("/ws", get(live_updates))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Poller and hub diagnostics.
async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let snapshot = state.snapshots.current().await;

    Json(StatusResponse {
        generation: snapshot.generation,
        updated_at: snapshot.updated_at,
        train_count: snapshot.trains.len(),
        subscribers: state.hub.subscriber_count().await,
    })
}

/// Current snapshot, as fresh as the last successful poll.
async fn trains(State(state): State<AppState>) -> Response {
    let snapshot = state.snapshots.current().await;
    Json(&*snapshot).into_response()
}

/// Raw predictions fetched on demand, bypassing the snapshot.
async fn predictions(State(state): State<AppState>) -> Result<Response, AppError> {
    let predictions = state.upstream.fetch_predictions().await?;
    Ok(Json(predictions).into_response())
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// The on-demand upstream fetch failed
    Upstream { message: String },
}

impl From<TflError> for AppError {
    fn from(e: TflError) -> Self {
        AppError::Upstream {
            message: format!("failed to get predictions: {e}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Upstream { message } => (StatusCode::BAD_GATEWAY, message),
        };

        warn!(%status, "{message}");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
