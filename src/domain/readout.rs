// Derived metrics shown next to the charts
use crate::domain::telemetry::{RobotStatus, TelemetrySample};
use crate::domain::window::SampleWindow;

pub const LOW_BATTERY_PERCENT: f64 = 20.0;
pub const HIGH_TEMPERATURE_CELSIUS: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryLevel {
    Good,
    Low,
}

impl BatteryLevel {
    pub fn classify(battery_percent: f64) -> Self {
        if battery_percent > LOW_BATTERY_PERCENT {
            BatteryLevel::Good
        } else {
            BatteryLevel::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThermalState {
    Normal,
    High,
}

impl ThermalState {
    pub fn classify(temperature_celsius: f64) -> Self {
        if temperature_celsius < HIGH_TEMPERATURE_CELSIUS {
            ThermalState::Normal
        } else {
            ThermalState::High
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    BatteryLow,
    TemperatureHigh,
    RobotError,
}

impl Alert {
    pub fn as_str(&self) -> &'static str {
        match self {
            Alert::BatteryLow => "battery_low",
            Alert::TemperatureHigh => "temperature_high",
            Alert::RobotError => "robot_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryReadout {
    pub latest: TelemetrySample,
    pub battery_level: BatteryLevel,
    pub thermal_state: ThermalState,
    pub data_points: usize,
    pub alerts: Vec<Alert>,
}

impl TelemetryReadout {
    /// Readout for the newest sample in the window, `None` while it is empty.
    pub fn from_window(window: &SampleWindow) -> Option<Self> {
        let latest = window.latest()?.clone();
        let battery_level = BatteryLevel::classify(latest.battery_percent);
        let thermal_state = ThermalState::classify(latest.temperature_celsius);

        let mut alerts = Vec::new();
        if battery_level == BatteryLevel::Low {
            alerts.push(Alert::BatteryLow);
        }
        if thermal_state == ThermalState::High {
            alerts.push(Alert::TemperatureHigh);
        }
        if latest.status == RobotStatus::Error {
            alerts.push(Alert::RobotError);
        }

        Some(Self {
            latest,
            battery_level,
            thermal_state,
            data_points: window.len(),
            alerts,
        })
    }
}
