use serde::Deserialize;
use std::time::Duration;

use crate::domain::error::TelemetryError;

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    pub server: ServerSettings,
    pub stream: StreamSettings,
    pub simulator: SimulatorSettings,
    pub window: WindowSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StreamSettings {
    pub endpoint: String,
    pub reconnect_interval_ms: u64,
    pub max_reconnect_attempts: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulatorSettings {
    pub tick_interval_ms: u64,
    #[serde(default)]
    pub seed: Option<u64>,
    pub error_probability: f64,
    #[serde(default)]
    pub autostart: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WindowSettings {
    pub capacity: usize,
}

impl StreamSettings {
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }
}

impl SimulatorSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl TelemetryConfig {
    /// Reject settings that can only be programmer mistakes.
    pub fn validate(&self) -> Result<(), TelemetryError> {
        if self.simulator.tick_interval_ms == 0 {
            return Err(TelemetryError::invalid("simulator.tick_interval_ms must be positive"));
        }
        if self.stream.reconnect_interval_ms == 0 {
            return Err(TelemetryError::invalid("stream.reconnect_interval_ms must be positive"));
        }
        if self.window.capacity == 0 {
            return Err(TelemetryError::invalid("window.capacity must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.simulator.error_probability) {
            return Err(TelemetryError::invalid("simulator.error_probability must be within [0, 1]"));
        }
        if self.stream.endpoint.trim().is_empty() {
            return Err(TelemetryError::invalid("stream.endpoint must not be empty"));
        }
        Ok(())
    }
}

fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    config::Config::builder()
        .set_default("server.bind_addr", "0.0.0.0:8080")?
        .set_default("stream.endpoint", "ws://localhost:8080/telemetry")?
        .set_default("stream.reconnect_interval_ms", 5000)?
        .set_default("stream.max_reconnect_attempts", 5)?
        .set_default("simulator.tick_interval_ms", 1000)?
        .set_default("simulator.error_probability", 0.05)?
        .set_default("simulator.autostart", false)?
        .set_default("window.capacity", 30)
}

/// `config/telemetry.toml` (optional) layered under `TELEMETRY__SECTION__KEY` env vars.
pub fn load_telemetry_config() -> anyhow::Result<TelemetryConfig> {
    let settings = builder()?
        .add_source(config::File::with_name("config/telemetry").required(false))
        .add_source(config::Environment::with_prefix("TELEMETRY").separator("__"))
        .build()?;

    let config: TelemetryConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(text: &str) -> TelemetryConfig {
        builder()
            .unwrap()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = from_toml("");
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.stream.reconnect_interval(), Duration::from_secs(5));
        assert_eq!(config.stream.max_reconnect_attempts, 5);
        assert_eq!(config.simulator.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.simulator.seed, None);
        assert_eq!(config.window.capacity, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = from_toml(
            r#"
            [stream]
            endpoint = "ws://robot.local:9000/telemetry"
            reconnect_interval_ms = 3000
            max_reconnect_attempts = 10

            [simulator]
            seed = 7
            autostart = true
            "#,
        );
        assert_eq!(config.stream.endpoint, "ws://robot.local:9000/telemetry");
        assert_eq!(config.stream.max_reconnect_attempts, 10);
        assert_eq!(config.simulator.seed, Some(7));
        assert!(config.simulator.autostart);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = from_toml("");
        config.window.capacity = 0;
        assert!(matches!(config.validate(), Err(TelemetryError::InvalidConfig(_))));

        let mut config = from_toml("");
        config.simulator.tick_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = from_toml("");
        config.simulator.error_probability = 2.0;
        assert!(config.validate().is_err());
    }
}
