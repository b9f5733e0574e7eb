// Feeds a monitor from a remote telemetry stream instead of the simulator
use std::sync::Arc;

use crate::application::telemetry_monitor::TelemetryMonitor;
use crate::infrastructure::stream_client::{StreamObserver, TransportError};
use crate::infrastructure::wire::TelemetryMessage;

pub struct RemoteFeed {
    monitor: Arc<TelemetryMonitor>,
}

impl RemoteFeed {
    pub fn new(monitor: Arc<TelemetryMonitor>) -> Self {
        Self { monitor }
    }
}

impl StreamObserver<TelemetryMessage> for RemoteFeed {
    fn on_open(&self) {
        tracing::info!("Telemetry stream connected");
    }

    fn on_message(&self, message: TelemetryMessage) {
        self.monitor.ingest(message.into());

        if let Some(readout) = self.monitor.readout() {
            tracing::debug!(
                battery = readout.latest.battery_percent,
                temperature = readout.latest.temperature_celsius,
                status = readout.latest.status.as_str(),
                data_points = readout.data_points,
                "Telemetry sample"
            );
            for alert in &readout.alerts {
                tracing::warn!(alert = alert.as_str(), "Telemetry alert");
            }
        }
    }

    fn on_error(&self, error: &TransportError) {
        tracing::warn!("Telemetry stream error: {}", error);
    }

    fn on_close(&self) {
        tracing::info!("Telemetry stream disconnected");
    }

    fn on_failed(&self) {
        tracing::error!("Telemetry stream gave up reconnecting");
    }
}
