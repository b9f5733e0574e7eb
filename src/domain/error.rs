// Domain errors
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Programmer error caught at construction time (zero capacity, zero interval, ...).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TelemetryError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
