// Telemetry data domain models

/// Planar position of the robot, unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RobotStatus {
    Active,
    Idle,
    Error,
}

impl RobotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RobotStatus::Active => "active",
            RobotStatus::Idle => "idle",
            RobotStatus::Error => "error",
        }
    }
}

/// One timestamped snapshot of the robot's sensor, motor and battery state.
///
/// Out-of-range readings (a 70 °C temperature, say) are kept as-is; sensor
/// noise is expected and the window stores whatever the producer reported.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySample {
    pub timestamp_ms: i64,
    pub battery_percent: f64,
    pub temperature_celsius: f64,
    pub motor_speed_rpm: f64,
    pub position: Vec2,
    /// Gyroscope angles in degrees, each in [0, 360).
    pub orientation: Vec3,
    /// Accelerometer reading in g, each in [-1, 1].
    pub acceleration: Vec3,
    pub status: RobotStatus,
}

/// Which scalar of a sample a chart series plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Battery,
    Temperature,
    MotorSpeed,
}

impl Metric {
    pub fn value_of(&self, sample: &TelemetrySample) -> f64 {
        match self {
            Metric::Battery => sample.battery_percent,
            Metric::Temperature => sample.temperature_celsius,
            Metric::MotorSpeed => sample.motor_speed_rpm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub time_ms: i64,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn sample(timestamp_ms: i64, battery_percent: f64) -> TelemetrySample {
        TelemetrySample {
            timestamp_ms,
            battery_percent,
            temperature_celsius: 30.0,
            motor_speed_rpm: 42.0,
            position: Vec2::new(1.5, -2.5),
            orientation: Vec3::new(10.0, 20.0, 30.0),
            acceleration: Vec3::new(0.1, -0.2, 0.3),
            status: RobotStatus::Active,
        }
    }
}
