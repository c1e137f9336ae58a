//! Error types for DomeIO

use std::time::Duration;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// DomeIO error types
///
/// Transport failures (serial/I-O/timeout) always trigger a best-effort stop
/// of both rotation channels before they propagate. Protocol failures
/// (`NoReading`, `ReadingOutOfRange`) are fatal to the current rotation
/// attempt only. Plan and configuration failures abort before any hardware
/// command is issued.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Write or read timed out on the dome-controller link
    #[error("Transport timeout on dome-controller link")]
    Timeout,

    /// No azimuth packet arrived within the query timeout
    #[error("No azimuth reading within {waited:?}")]
    NoReading {
        /// How long the reader waited before giving up
        waited: Duration,
    },

    /// Azimuth reading outside the tolerated raw range
    #[error("Azimuth reading {0} outside tolerated range [-2, 362]")]
    ReadingOutOfRange(f64),

    /// Timed-burst duration outside the configured bound
    #[error("Rotation duration {requested}s outside [0, {max}]s")]
    InvalidDuration {
        /// Requested burst duration in seconds
        requested: f64,
        /// Configured maximum in seconds
        max: f64,
    },

    /// Target heading outside [0, 360)
    #[error("Target azimuth {0} outside [0, 360)")]
    InvalidTarget(f64),

    /// Observation plan rejected at load time
    #[error("Invalid plan: {0}")]
    Plan(String),

    /// Observation plan file failed to parse
    #[error("Plan parse error: {0}")]
    PlanParse(#[from] serde_json::Error),

    /// Configuration file failed to parse
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration serialization failed
    #[error("Config write error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Operator pressed Ctrl-C
    #[error("Cancelled by operator")]
    Cancelled,

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
