// Application layer - Sample producers and the monitor that consumes them
pub mod remote_feed;
pub mod sample_generator;
pub mod simulator;
pub mod telemetry_monitor;
