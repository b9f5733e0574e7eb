// Bounded sample window for charting.
// Invariants: len <= capacity, arrival order preserved, oldest evicted first.
use std::collections::VecDeque;

use crate::domain::error::TelemetryError;
use crate::domain::telemetry::{Metric, TelemetrySample, TimeSeriesPoint};

#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: VecDeque<TelemetrySample>,
    capacity: usize,
}

impl SampleWindow {
    pub fn new(capacity: usize) -> Result<Self, TelemetryError> {
        if capacity == 0 {
            return Err(TelemetryError::invalid("window capacity must be at least 1"));
        }
        Ok(Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    pub fn push(&mut self, sample: TelemetrySample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn latest(&self) -> Option<&TelemetrySample> {
        self.samples.back()
    }

    /// Owned snapshot, oldest to newest.
    pub fn all(&self) -> Vec<TelemetrySample> {
        self.samples.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Chart series for one metric over the retained samples.
    pub fn series(&self, metric: Metric) -> Vec<TimeSeriesPoint> {
        self.samples
            .iter()
            .map(|s| TimeSeriesPoint::new(s.timestamp_ms, metric.value_of(s)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::fixtures::sample;

    fn batteries(window: &SampleWindow) -> Vec<f64> {
        window.all().iter().map(|s| s.battery_percent).collect()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            SampleWindow::new(0),
            Err(TelemetryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut window = SampleWindow::new(3).unwrap();
        for (i, battery) in [90.0, 85.0, 80.0, 75.0].into_iter().enumerate() {
            window.push(sample(i as i64, battery));
        }

        assert_eq!(batteries(&window), vec![85.0, 80.0, 75.0]);
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn test_keeps_last_capacity_samples_in_order() {
        let capacity = 7;
        let mut window = SampleWindow::new(capacity).unwrap();
        let pushed: Vec<TelemetrySample> = (0..50).map(|i| sample(i, 100.0 - i as f64)).collect();

        for (n, s) in pushed.iter().enumerate() {
            window.push(s.clone());
            assert!(window.len() <= capacity);
            assert_eq!(window.latest(), window.all().last());
            assert_eq!(window.latest(), Some(&pushed[n]));
        }

        assert_eq!(window.all(), pushed[pushed.len() - capacity..].to_vec());
    }

    #[test]
    fn test_latest_absent_when_empty() {
        let mut window = SampleWindow::new(2).unwrap();
        assert!(window.latest().is_none());
        assert_eq!(window.len(), 0);

        window.push(sample(1, 50.0));
        window.clear();
        assert!(window.latest().is_none());
        assert!(window.all().is_empty());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut window = SampleWindow::new(2).unwrap();
        window.push(sample(1, 50.0));

        let mut snapshot = window.all();
        snapshot.clear();

        assert_eq!(window.len(), 1);
    }

    #[test]
    fn test_series_follows_window() {
        let mut window = SampleWindow::new(30).unwrap();
        window.push(sample(1000, 99.5));
        window.push(sample(2000, 99.0));

        let series = window.series(Metric::Battery);
        assert_eq!(
            series,
            vec![
                TimeSeriesPoint::new(1000, 99.5),
                TimeSeriesPoint::new(2000, 99.0)
            ]
        );
        assert_eq!(window.capacity(), 30);
    }
}
