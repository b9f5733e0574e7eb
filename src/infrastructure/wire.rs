// JSON wire shape exchanged with dashboards and real device links
use serde::{Deserialize, Serialize};

use crate::domain::telemetry::{RobotStatus, TelemetrySample, Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WireVec2 {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WireVec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WireSensors {
    pub gyro: WireVec3,
    pub accelerometer: WireVec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireStatus {
    Active,
    Idle,
    Error,
}

/// `{ timestamp, battery, temperature, motorSpeed, position, sensors, status }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryMessage {
    pub timestamp: i64,
    pub battery: f64,
    pub temperature: f64,
    pub motor_speed: f64,
    pub position: WireVec2,
    pub sensors: WireSensors,
    pub status: WireStatus,
}

/// `{"command": "start" | "stop" | "reset"}` sent by a dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum TelemetryCommand {
    Start,
    Stop,
    Reset,
}

impl From<Vec2> for WireVec2 {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<WireVec2> for Vec2 {
    fn from(v: WireVec2) -> Self {
        Vec2::new(v.x, v.y)
    }
}

impl From<Vec3> for WireVec3 {
    fn from(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

impl From<WireVec3> for Vec3 {
    fn from(v: WireVec3) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

impl From<RobotStatus> for WireStatus {
    fn from(status: RobotStatus) -> Self {
        match status {
            RobotStatus::Active => WireStatus::Active,
            RobotStatus::Idle => WireStatus::Idle,
            RobotStatus::Error => WireStatus::Error,
        }
    }
}

impl From<WireStatus> for RobotStatus {
    fn from(status: WireStatus) -> Self {
        match status {
            WireStatus::Active => RobotStatus::Active,
            WireStatus::Idle => RobotStatus::Idle,
            WireStatus::Error => RobotStatus::Error,
        }
    }
}

impl From<&TelemetrySample> for TelemetryMessage {
    fn from(sample: &TelemetrySample) -> Self {
        Self {
            timestamp: sample.timestamp_ms,
            battery: sample.battery_percent,
            temperature: sample.temperature_celsius,
            motor_speed: sample.motor_speed_rpm,
            position: sample.position.into(),
            sensors: WireSensors {
                gyro: sample.orientation.into(),
                accelerometer: sample.acceleration.into(),
            },
            status: sample.status.into(),
        }
    }
}

impl From<TelemetryMessage> for TelemetrySample {
    fn from(msg: TelemetryMessage) -> Self {
        Self {
            timestamp_ms: msg.timestamp,
            battery_percent: msg.battery,
            temperature_celsius: msg.temperature,
            motor_speed_rpm: msg.motor_speed,
            position: msg.position.into(),
            orientation: msg.sensors.gyro.into(),
            acceleration: msg.sensors.accelerometer.into(),
            status: msg.status.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sample_generator::SampleGenerator;
    use serde_json::json;

    #[test]
    fn test_wire_field_names() {
        let mut sample = crate::domain::telemetry::fixtures::sample(1_700_000_000_000, 97.25);
        sample.status = RobotStatus::Idle;

        let value = serde_json::to_value(TelemetryMessage::from(&sample)).unwrap();
        assert_eq!(
            value,
            json!({
                "timestamp": 1_700_000_000_000i64,
                "battery": 97.25,
                "temperature": 30.0,
                "motorSpeed": 42.0,
                "position": { "x": 1.5, "y": -2.5 },
                "sensors": {
                    "gyro": { "x": 10.0, "y": 20.0, "z": 30.0 },
                    "accelerometer": { "x": 0.1, "y": -0.2, "z": 0.3 }
                },
                "status": "idle"
            })
        );
    }

    #[test]
    fn test_generated_samples_survive_json() {
        let mut generator = SampleGenerator::from_seed(99);
        for tick in 0..25 {
            let sample = generator.next_sample(tick * 1_000);
            let text = serde_json::to_string(&TelemetryMessage::from(&sample)).unwrap();
            let decoded: TelemetryMessage = serde_json::from_str(&text).unwrap();
            assert_eq!(TelemetrySample::from(decoded), sample);
        }
    }

    #[test]
    fn test_command_shape() {
        let start: TelemetryCommand = serde_json::from_str(r#"{"command":"start"}"#).unwrap();
        assert_eq!(start, TelemetryCommand::Start);
        assert_eq!(
            serde_json::to_string(&TelemetryCommand::Reset).unwrap(),
            r#"{"command":"reset"}"#
        );
        assert!(serde_json::from_str::<TelemetryCommand>(r#"{"command":"explode"}"#).is_err());
    }

    #[test]
    fn test_rejects_unknown_status() {
        let text = r#"{"timestamp":1,"battery":1,"temperature":1,"motorSpeed":1,
            "position":{"x":0,"y":0},
            "sensors":{"gyro":{"x":0,"y":0,"z":0},"accelerometer":{"x":0,"y":0,"z":0}},
            "status":"sleeping"}"#;
        assert!(serde_json::from_str::<TelemetryMessage>(text).is_err());
    }
}
