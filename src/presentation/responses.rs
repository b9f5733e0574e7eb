// JSON response bodies
use serde::Serialize;

use crate::application::telemetry_monitor::WindowSnapshot;
use crate::domain::readout::{BatteryLevel, TelemetryReadout, ThermalState};
use crate::domain::telemetry::TimeSeriesPoint;
use crate::infrastructure::wire::TelemetryMessage;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointResponse {
    pub time_ms: i64,
    pub value: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadoutResponse {
    pub latest: TelemetryMessage,
    pub battery_level: &'static str,
    pub thermal_state: &'static str,
    pub data_points: usize,
    pub alerts: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowResponse {
    pub running: bool,
    pub capacity: usize,
    pub samples: Vec<TelemetryMessage>,
    pub readout: Option<ReadoutResponse>,
    pub battery_series: Vec<PointResponse>,
    pub temperature_series: Vec<PointResponse>,
    pub motor_speed_series: Vec<PointResponse>,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub running: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&TimeSeriesPoint> for PointResponse {
    fn from(point: &TimeSeriesPoint) -> Self {
        Self {
            time_ms: point.time_ms,
            value: point.value,
        }
    }
}

impl From<TelemetryReadout> for ReadoutResponse {
    fn from(readout: TelemetryReadout) -> Self {
        Self {
            latest: TelemetryMessage::from(&readout.latest),
            battery_level: match readout.battery_level {
                BatteryLevel::Good => "good",
                BatteryLevel::Low => "low",
            },
            thermal_state: match readout.thermal_state {
                ThermalState::Normal => "normal",
                ThermalState::High => "high",
            },
            data_points: readout.data_points,
            alerts: readout.alerts.iter().map(|a| a.as_str()).collect(),
        }
    }
}

impl From<WindowSnapshot> for WindowResponse {
    fn from(snapshot: WindowSnapshot) -> Self {
        Self {
            running: snapshot.running,
            capacity: snapshot.capacity,
            samples: snapshot.samples.iter().map(TelemetryMessage::from).collect(),
            readout: snapshot.readout.map(ReadoutResponse::from),
            battery_series: snapshot.battery_series.iter().map(PointResponse::from).collect(),
            temperature_series: snapshot
                .temperature_series
                .iter()
                .map(PointResponse::from)
                .collect(),
            motor_speed_series: snapshot
                .motor_speed_series
                .iter()
                .map(PointResponse::from)
                .collect(),
        }
    }
}
