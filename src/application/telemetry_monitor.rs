// Telemetry monitor - owns the window and its producer, handles start/stop/reset
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;

use crate::application::sample_generator::SampleGenerator;
use crate::application::simulator::{SampleSink, TelemetrySimulator};
use crate::domain::error::TelemetryError;
use crate::domain::readout::TelemetryReadout;
use crate::domain::telemetry::{Metric, TelemetrySample, TimeSeriesPoint};
use crate::domain::window::SampleWindow;

const UPDATE_CHANNEL_CAPACITY: usize = 100;

/// Everything a dashboard needs to render one frame.
#[derive(Debug, Clone)]
pub struct WindowSnapshot {
    pub running: bool,
    pub capacity: usize,
    pub samples: Vec<TelemetrySample>,
    pub readout: Option<TelemetryReadout>,
    pub battery_series: Vec<TimeSeriesPoint>,
    pub temperature_series: Vec<TimeSeriesPoint>,
    pub motor_speed_series: Vec<TimeSeriesPoint>,
}

pub struct TelemetryMonitor {
    window: Arc<Mutex<SampleWindow>>,
    updates: broadcast::Sender<TelemetrySample>,
    simulator: TelemetrySimulator,
    tick_interval: Duration,
}

fn lock_window(window: &Mutex<SampleWindow>) -> MutexGuard<'_, SampleWindow> {
    window.lock().unwrap_or_else(PoisonError::into_inner)
}

fn record(
    window: &Mutex<SampleWindow>,
    updates: &broadcast::Sender<TelemetrySample>,
    sample: TelemetrySample,
) {
    lock_window(window).push(sample.clone());
    // No subscribers is fine, the window still has the sample.
    let _ = updates.send(sample);
}

impl TelemetryMonitor {
    pub fn new(
        window_capacity: usize,
        tick_interval: Duration,
        generator: SampleGenerator,
    ) -> Result<Self, TelemetryError> {
        if tick_interval.is_zero() {
            return Err(TelemetryError::invalid("tick interval must be positive"));
        }
        let window = Arc::new(Mutex::new(SampleWindow::new(window_capacity)?));
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);

        let sink: SampleSink = {
            let window = window.clone();
            let updates = updates.clone();
            Arc::new(move |sample| record(&window, &updates, sample))
        };

        Ok(Self {
            window,
            updates,
            simulator: TelemetrySimulator::new(generator, sink),
            tick_interval,
        })
    }

    pub fn start(&self) -> Result<(), TelemetryError> {
        self.simulator.start(self.tick_interval)
    }

    pub fn stop(&self) {
        self.simulator.stop();
    }

    /// Clear the history and recharge the simulated battery. Leaves the simulator running state alone.
    pub fn reset(&self) {
        self.simulator.reset();
        lock_window(&self.window).clear();
        tracing::info!("Telemetry window reset");
    }

    /// Accept a sample from any producer, e.g. a remote stream.
    pub fn ingest(&self, sample: TelemetrySample) {
        record(&self.window, &self.updates, sample);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TelemetrySample> {
        self.updates.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.simulator.is_running()
    }

    pub fn readout(&self) -> Option<TelemetryReadout> {
        TelemetryReadout::from_window(&lock_window(&self.window))
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        // Simulator gate before window: the tick task locks them in that order.
        let running = self.simulator.is_running();
        let window = lock_window(&self.window);
        WindowSnapshot {
            running,
            capacity: window.capacity(),
            samples: window.all(),
            readout: TelemetryReadout::from_window(&window),
            battery_series: window.series(Metric::Battery),
            temperature_series: window.series(Metric::Temperature),
            motor_speed_series: window.series(Metric::MotorSpeed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::fixtures::sample;
    use tokio::time;

    fn monitor(capacity: usize) -> TelemetryMonitor {
        TelemetryMonitor::new(capacity, Duration::from_millis(1000), SampleGenerator::from_seed(21))
            .unwrap()
    }

    #[test]
    fn test_invalid_construction() {
        assert!(TelemetryMonitor::new(0, Duration::from_secs(1), SampleGenerator::from_seed(1)).is_err());
        assert!(TelemetryMonitor::new(30, Duration::ZERO, SampleGenerator::from_seed(1)).is_err());
    }

    #[tokio::test]
    async fn test_ingest_fills_window_and_broadcasts() {
        let monitor = monitor(3);
        let mut rx = monitor.subscribe();

        for (i, battery) in [90.0, 85.0, 80.0, 75.0].into_iter().enumerate() {
            monitor.ingest(sample(i as i64, battery));
        }

        let snapshot = monitor.snapshot();
        let batteries: Vec<f64> = snapshot.samples.iter().map(|s| s.battery_percent).collect();
        assert_eq!(batteries, vec![85.0, 80.0, 75.0]);
        assert_eq!(snapshot.readout.unwrap().data_points, 3);
        assert_eq!(snapshot.battery_series.len(), 3);
        assert_eq!(rx.recv().await.unwrap().battery_percent, 90.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_stop_reset() {
        let monitor = monitor(30);
        monitor.start().unwrap();
        assert!(monitor.is_running());

        time::sleep(Duration::from_millis(3500)).await;
        monitor.stop();
        monitor.stop();
        assert!(!monitor.is_running());

        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.samples.len(), 3);
        assert!(!snapshot.running);

        monitor.reset();
        let snapshot = monitor.snapshot();
        assert!(snapshot.samples.is_empty());
        assert!(snapshot.readout.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_keeps_last_thirty() {
        let monitor = TelemetryMonitor::new(30, Duration::from_millis(10), SampleGenerator::from_seed(2))
            .unwrap();
        monitor.start().unwrap();
        time::sleep(Duration::from_millis(455)).await;
        monitor.stop();

        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.samples.len(), 30);
        assert!(snapshot
            .samples
            .windows(2)
            .all(|w| w[0].battery_percent >= w[1].battery_percent));
    }
}
