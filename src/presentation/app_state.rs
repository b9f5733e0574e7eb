// Application state for HTTP handlers
use std::sync::Arc;

use crate::application::telemetry_monitor::TelemetryMonitor;
use crate::domain::error::TelemetryError;
use crate::infrastructure::wire::TelemetryCommand;

#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<TelemetryMonitor>,
}

impl AppState {
    pub fn apply(&self, command: TelemetryCommand) -> Result<(), TelemetryError> {
        tracing::debug!("Applying command {:?}", command);
        match command {
            TelemetryCommand::Start => self.monitor.start(),
            TelemetryCommand::Stop => {
                self.monitor.stop();
                Ok(())
            }
            TelemetryCommand::Reset => {
                self.monitor.reset();
                Ok(())
            }
        }
    }
}
