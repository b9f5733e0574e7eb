// Presentation layer - HTTP and WebSocket surface
pub mod app_state;
pub mod handlers;
pub mod responses;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    health_check, reset_telemetry, start_simulation, stop_simulation, telemetry_socket,
    window_snapshot,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/telemetry", get(telemetry_socket))
        .route("/telemetry/window", get(window_snapshot))
        .route("/telemetry/start", post(start_simulation))
        .route("/telemetry/stop", post(stop_simulation))
        .route("/telemetry/reset", post(reset_telemetry))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
