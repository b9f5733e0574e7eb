// Synthetic robot telemetry with an injectable random source
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::error::TelemetryError;
use crate::domain::telemetry::{RobotStatus, TelemetrySample, Vec2, Vec3};

pub const DEFAULT_ERROR_PROBABILITY: f64 = 0.05;

const FULL_BATTERY_PERCENT: f64 = 100.0;
const MAX_BATTERY_DRAIN_PER_TICK: f64 = 0.5;
const BASE_TEMPERATURE_CELSIUS: f64 = 25.0;
const TEMPERATURE_SPREAD_CELSIUS: f64 = 10.0;
const MAX_MOTOR_SPEED_RPM: f64 = 100.0;
const POSITION_EXTENT: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct SampleGenerator<R = StdRng> {
    rng: R,
    battery_percent: f64,
    last_timestamp_ms: Option<i64>,
    error_probability: f64,
}

impl SampleGenerator<StdRng> {
    /// Deterministic generator, same seed gives the same sequence.
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl<R: Rng> SampleGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            battery_percent: FULL_BATTERY_PERCENT,
            last_timestamp_ms: None,
            error_probability: DEFAULT_ERROR_PROBABILITY,
        }
    }

    pub fn with_error_probability(mut self, probability: f64) -> Result<Self, TelemetryError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(TelemetryError::invalid(format!(
                "error probability must be within [0, 1], got {}",
                probability
            )));
        }
        self.error_probability = probability;
        Ok(self)
    }

    /// Produce the sample for one tick observed at `now_ms`.
    pub fn next_sample(&mut self, now_ms: i64) -> TelemetrySample {
        let timestamp_ms = match self.last_timestamp_ms {
            Some(last) => now_ms.max(last),
            None => now_ms,
        };
        self.last_timestamp_ms = Some(timestamp_ms);

        let drain = self.rng.gen_range(0.0..MAX_BATTERY_DRAIN_PER_TICK);
        self.battery_percent = (self.battery_percent - drain).max(0.0);

        let temperature_celsius =
            BASE_TEMPERATURE_CELSIUS + self.rng.gen_range(0.0..TEMPERATURE_SPREAD_CELSIUS);
        let motor_speed_rpm = self.rng.gen_range(0.0..MAX_MOTOR_SPEED_RPM);
        let position = Vec2::new(
            self.rng.gen_range(-POSITION_EXTENT..POSITION_EXTENT),
            self.rng.gen_range(-POSITION_EXTENT..POSITION_EXTENT),
        );
        let orientation = Vec3::new(
            self.rng.gen_range(0.0..360.0),
            self.rng.gen_range(0.0..360.0),
            self.rng.gen_range(0.0..360.0),
        );
        let acceleration = Vec3::new(
            self.rng.gen_range(-1.0..1.0),
            self.rng.gen_range(-1.0..1.0),
            self.rng.gen_range(-1.0..1.0),
        );

        let status = if self.rng.gen_bool(self.error_probability) {
            RobotStatus::Error
        } else if self.rng.gen_bool(0.5) {
            RobotStatus::Active
        } else {
            RobotStatus::Idle
        };

        TelemetrySample {
            timestamp_ms,
            battery_percent: self.battery_percent,
            temperature_celsius,
            motor_speed_rpm,
            position,
            orientation,
            acceleration,
            status,
        }
    }

    /// Back to a full battery; the timestamp floor is kept so time never rewinds.
    pub fn reset(&mut self) {
        self.battery_percent = FULL_BATTERY_PERCENT;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_within_ranges() {
        let mut generator = SampleGenerator::from_seed(7);
        for tick in 0..500 {
            let s = generator.next_sample(1_000 * tick);
            assert!((0.0..=100.0).contains(&s.battery_percent));
            assert!((25.0..35.0).contains(&s.temperature_celsius));
            assert!((0.0..100.0).contains(&s.motor_speed_rpm));
            assert!((-100.0..100.0).contains(&s.position.x));
            assert!((-100.0..100.0).contains(&s.position.y));
            for angle in [s.orientation.x, s.orientation.y, s.orientation.z] {
                assert!((0.0..360.0).contains(&angle));
            }
            for g in [s.acceleration.x, s.acceleration.y, s.acceleration.z] {
                assert!((-1.0..1.0).contains(&g));
            }
        }
    }

    #[test]
    fn test_battery_drains_and_floors_at_zero() {
        let mut generator = SampleGenerator::from_seed(11);
        let mut previous = 100.0;
        for tick in 0..1_000 {
            let s = generator.next_sample(tick);
            assert!(s.battery_percent <= previous);
            assert!(previous - s.battery_percent < 0.5);
            previous = s.battery_percent;
        }
        assert_eq!(previous, 0.0);

        generator.reset();
        assert!(generator.next_sample(1_000).battery_percent > 99.5);
    }

    #[test]
    fn test_timestamps_never_go_backwards() {
        let mut generator = SampleGenerator::from_seed(3);
        let first = generator.next_sample(5_000);
        let second = generator.next_sample(4_000);
        let third = generator.next_sample(6_000);

        assert_eq!(first.timestamp_ms, 5_000);
        assert_eq!(second.timestamp_ms, 5_000);
        assert_eq!(third.timestamp_ms, 6_000);
    }

    #[test]
    fn test_same_seed_same_samples() {
        let mut a = SampleGenerator::from_seed(42);
        let mut b = SampleGenerator::from_seed(42);
        for tick in 0..20 {
            assert_eq!(a.next_sample(tick), b.next_sample(tick));
        }
    }

    #[test]
    fn test_error_probability_controls_status() {
        let mut always = SampleGenerator::from_seed(1)
            .with_error_probability(1.0)
            .unwrap();
        let mut never = SampleGenerator::from_seed(1)
            .with_error_probability(0.0)
            .unwrap();

        for tick in 0..100 {
            assert_eq!(always.next_sample(tick).status, RobotStatus::Error);
            assert_ne!(never.next_sample(tick).status, RobotStatus::Error);
        }
    }

    #[test]
    fn test_invalid_error_probability() {
        assert!(SampleGenerator::from_seed(1).with_error_probability(1.5).is_err());
        assert!(SampleGenerator::from_seed(1).with_error_probability(-0.1).is_err());
    }
}
