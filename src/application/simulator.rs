// Timer-driven telemetry simulator
//
// Stands in for a real device link: one sample per tick handed to a sink.
// Emission and `stop()` take the same lock, so once `stop()` returns no
// further sample reaches the sink. The sink therefore must not call back
// into the simulator.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::application::sample_generator::SampleGenerator;
use crate::domain::error::TelemetryError;
use crate::domain::telemetry::TelemetrySample;

pub type SampleSink = Arc<dyn Fn(TelemetrySample) + Send + Sync>;

struct Gate {
    generator: SampleGenerator,
    running: bool,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

pub struct TelemetrySimulator {
    gate: Arc<Mutex<Gate>>,
    sink: SampleSink,
}

fn lock(gate: &Mutex<Gate>) -> MutexGuard<'_, Gate> {
    gate.lock().unwrap_or_else(PoisonError::into_inner)
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl TelemetrySimulator {
    pub fn new(generator: SampleGenerator, sink: SampleSink) -> Self {
        Self {
            gate: Arc::new(Mutex::new(Gate {
                generator,
                running: false,
                generation: 0,
                task: None,
            })),
            sink,
        }
    }

    /// Begin emitting one sample every `interval`. Starting twice keeps the first timer.
    pub fn start(&self, interval: Duration) -> Result<(), TelemetryError> {
        if interval.is_zero() {
            return Err(TelemetryError::invalid("tick interval must be positive"));
        }

        let mut gate = lock(&self.gate);
        if gate.running {
            tracing::debug!("Simulator already running, ignoring start");
            return Ok(());
        }
        gate.running = true;
        gate.generation += 1;
        let generation = gate.generation;

        let shared = self.gate.clone();
        let sink = self.sink.clone();
        gate.task = Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let mut gate = lock(&shared);
                if !gate.running || gate.generation != generation {
                    break;
                }
                let sample = gate.generator.next_sample(now_ms());
                sink(sample);
            }
        }));

        tracing::info!(interval_ms = interval.as_millis() as u64, "Simulator started");
        Ok(())
    }

    pub fn stop(&self) {
        let mut gate = lock(&self.gate);
        let was_running = gate.running;
        gate.running = false;
        if let Some(task) = gate.task.take() {
            task.abort();
        }
        if was_running {
            tracing::info!("Simulator stopped");
        }
    }

    /// Restore the generator to a full battery. Does not touch the running timer.
    pub fn reset(&self) {
        lock(&self.gate).generator.reset();
    }

    pub fn is_running(&self) -> bool {
        lock(&self.gate).running
    }
}

impl Drop for TelemetrySimulator {
    fn drop(&mut self) {
        self.stop();
    }
}
