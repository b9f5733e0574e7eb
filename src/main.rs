// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::application::remote_feed::RemoteFeed;
use crate::application::sample_generator::SampleGenerator;
use crate::application::telemetry_monitor::TelemetryMonitor;
use crate::infrastructure::config::{load_telemetry_config, TelemetryConfig};
use crate::infrastructure::stream_client::{StreamClient, StreamClientConfig};
use crate::infrastructure::websocket::WebSocketConnector;
use crate::infrastructure::wire::TelemetryMessage;
use crate::presentation::app_state::AppState;
use crate::presentation::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_telemetry_config()?;

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None | Some("serve") => serve(config).await,
        Some("watch") => {
            let endpoint = args.next().unwrap_or_else(|| config.stream.endpoint.clone());
            watch(config, endpoint).await
        }
        Some(other) => anyhow::bail!("unknown command '{}', expected 'serve' or 'watch [url]'", other),
    }
}

fn build_monitor(config: &TelemetryConfig) -> anyhow::Result<Arc<TelemetryMonitor>> {
    let generator = match config.simulator.seed {
        Some(seed) => SampleGenerator::from_seed(seed),
        None => SampleGenerator::from_entropy(),
    }
    .with_error_probability(config.simulator.error_probability)?;

    Ok(Arc::new(TelemetryMonitor::new(
        config.window.capacity,
        config.simulator.tick_interval(),
        generator,
    )?))
}

/// Simulator-backed telemetry server.
async fn serve(config: TelemetryConfig) -> anyhow::Result<()> {
    let monitor = build_monitor(&config)?;
    if config.simulator.autostart {
        monitor.start()?;
    }

    let state = Arc::new(AppState {
        monitor: monitor.clone(),
    });

    let addr: SocketAddr = config.server.bind_addr.parse()?;
    tracing::info!("Starting robot-telemetry service on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    monitor.stop();
    Ok(())
}

/// Follow a remote telemetry endpoint until interrupted.
async fn watch(config: TelemetryConfig, endpoint: String) -> anyhow::Result<()> {
    let monitor = build_monitor(&config)?;
    let client_config = StreamClientConfig::new(endpoint)
        .with_reconnect_interval(config.stream.reconnect_interval())
        .with_max_reconnect_attempts(config.stream.max_reconnect_attempts);

    let client: StreamClient<TelemetryMessage> = StreamClient::new(
        client_config,
        Arc::new(WebSocketConnector),
        Arc::new(RemoteFeed::new(monitor.clone())),
    )?;

    tracing::info!("Watching telemetry at {}", client.endpoint());
    let mut state = client.subscribe_state();
    let status = tokio::spawn(async move {
        while state.changed().await.is_ok() {
            let current = *state.borrow_and_update();
            tracing::info!("Connection status: {:?}", current);
        }
    });

    client.connect();
    tokio::signal::ctrl_c().await?;

    tracing::info!(
        "Stopping in state {:?} after {} reconnect attempts",
        client.state(),
        client.reconnect_attempts()
    );
    client.disconnect();
    status.abort();
    let snapshot = monitor.snapshot();
    tracing::info!(
        "Stopped watching, {} samples retained (capacity {})",
        snapshot.samples.len(),
        snapshot.capacity
    );
    Ok(())
}
