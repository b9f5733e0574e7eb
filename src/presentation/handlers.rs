// HTTP request handlers
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::StreamExt;

use crate::infrastructure::message_stream::stream_from_receiver;
use crate::infrastructure::wire::TelemetryCommand;
use crate::presentation::app_state::AppState;
use crate::presentation::responses::{CommandResponse, ErrorResponse, WindowResponse};

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn window_snapshot(State(state): State<Arc<AppState>>) -> Json<WindowResponse> {
    Json(WindowResponse::from(state.monitor.snapshot()))
}

pub async fn start_simulation(State(state): State<Arc<AppState>>) -> Response {
    command_response(&state, TelemetryCommand::Start)
}

pub async fn stop_simulation(State(state): State<Arc<AppState>>) -> Response {
    command_response(&state, TelemetryCommand::Stop)
}

pub async fn reset_telemetry(State(state): State<Arc<AppState>>) -> Response {
    command_response(&state, TelemetryCommand::Reset)
}

fn command_response(state: &AppState, command: TelemetryCommand) -> Response {
    match state.apply(command) {
        Ok(()) => Json(CommandResponse {
            running: state.monitor.is_running(),
        })
        .into_response(),
        Err(e) => {
            tracing::error!("Command {:?} failed: {}", command, e);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Live telemetry feed: one wire message per sample; accepts commands inbound.
pub async fn telemetry_socket(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| stream_samples(socket, state))
}

async fn stream_samples(mut socket: WebSocket, state: Arc<AppState>) {
    tracing::info!("Telemetry subscriber connected");
    let mut messages = Box::pin(stream_from_receiver(state.monitor.subscribe()));

    loop {
        tokio::select! {
            outbound = messages.next() => {
                let Some(message) = outbound else { break };
                let text = match serde_json::to_string(&message) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!("Failed to encode telemetry message: {}", e);
                        continue;
                    }
                };
                if socket.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            inbound = socket.recv() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<TelemetryCommand>(&text) {
                        Ok(command) => {
                            if let Err(e) = state.apply(command) {
                                tracing::warn!("Command {:?} failed: {}", command, e);
                            }
                        }
                        Err(e) => tracing::warn!("Ignoring malformed command: {}", e),
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    tracing::warn!(?err, "Telemetry socket error");
                    break;
                }
            }
        }
    }
    tracing::info!("Telemetry subscriber disconnected");
}
