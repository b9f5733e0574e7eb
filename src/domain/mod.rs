// Domain layer - Telemetry values, the bounded window and derived readouts
pub mod error;
pub mod readout;
pub mod telemetry;
pub mod window;
