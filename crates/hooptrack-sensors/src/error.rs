//! Error types for the sensor backends.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("sensor read timed out after {0} ms")]
    ReadTimeout(u64),

    #[error("sensor disconnected: {0}")]
    Disconnected(String),

    #[error("sensor io error: {0}")]
    Io(#[from] std::io::Error),
}
