//! Configuration for the DomeIO application
//!
//! Loads configuration from a TOML file: serial link parameters, rotation
//! tunables, and the observation plan location.

use crate::error::Result;
use crate::rotation::RotationTuning;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub hardware: HardwareConfig,
    pub rotation: RotationConfig,
    pub schedule: ScheduleConfig,
    pub logging: LoggingConfig,
}

/// Hardware configuration (dome-controller serial link)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HardwareConfig {
    /// Dome motor controller serial device
    pub device: String,
    /// Baud rate (the dome controller speaks 9600)
    pub baud_rate: u32,
    /// Serial write timeout in milliseconds
    pub write_timeout_ms: u64,
}

/// Rotation tunables
///
/// These bound every motor command the controller can issue; they are threaded
/// explicitly through [`RotationTuning`] rather than held as process-wide
/// state so tests can vary them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RotationConfig {
    /// Bound on any timed burst and on a whole auto-rotate attempt
    pub max_rotation_duration_sec: f64,
    /// Auto-rotate declares arrival within this distance of the target
    pub arrival_tolerance_deg: f64,
    /// Remaining error below this hands the monitor loop over to the stop sequence
    pub monitor_cutoff_deg: f64,
    /// How long a position query waits for the first valid reading
    pub query_timeout_sec: f64,
    /// Quiescence window confirming the dome has fully stopped
    pub verify_stop_window_sec: f64,
    /// Telemetry poll granularity during the monitor loop
    pub poll_interval_ms: u64,
    /// Delay between the stop-right and stop-left tokens
    pub settle_delay_sec: f64,
}

/// Observation plan location
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleConfig {
    /// Directory holding observation plan files
    pub plan_dir: String,
    /// Plan file name within `plan_dir`
    pub plan_file: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl AppConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Default configuration for the Crocker dome
    ///
    /// Suitable for testing and development. Production deployments should use
    /// a proper TOML configuration file.
    pub fn crocker_defaults() -> Self {
        Self {
            hardware: HardwareConfig {
                device: "/dev/ttyUSB_DOME".to_string(),
                baud_rate: 9600,
                write_timeout_ms: 1000,
            },
            rotation: RotationConfig {
                max_rotation_duration_sec: 10.0,
                arrival_tolerance_deg: 3.0,
                monitor_cutoff_deg: 5.0,
                query_timeout_sec: 10.0,
                verify_stop_window_sec: 4.0,
                poll_interval_ms: 100,
                settle_delay_sec: 2.0,
            },
            schedule: ScheduleConfig {
                plan_dir: "obs_plans".to_string(),
                plan_file: "plan.json".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }

    /// Full path to the configured observation plan file
    pub fn plan_path(&self) -> PathBuf {
        Path::new(&self.schedule.plan_dir).join(&self.schedule.plan_file)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::crocker_defaults()
    }
}

impl RotationConfig {
    /// Build the runtime tuning passed to session constructors
    pub fn to_tuning(&self) -> RotationTuning {
        RotationTuning {
            max_rotation_secs: self.max_rotation_duration_sec,
            arrival_tolerance_deg: self.arrival_tolerance_deg,
            monitor_cutoff_deg: self.monitor_cutoff_deg,
            query_timeout: Duration::from_secs_f64(self.query_timeout_sec),
            verify_window: Duration::from_secs_f64(self.verify_stop_window_sec),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            settle_delay: Duration::from_secs_f64(self.settle_delay_sec),
            ..RotationTuning::default()
        }
    }
}
