//! Closed-loop dome rotation
//!
//! [`session::RotationSession`] owns the transport and the low-level motor
//! operations; [`controller`] drives it through the rotate-and-verify state
//! machine; [`angles`] holds the modulo-360 arithmetic underneath both.

pub mod angles;
pub mod controller;
pub mod session;

use std::time::Duration;

/// Tunables bounding every rotation operation
///
/// Threaded explicitly through session constructors rather than held as
/// process-wide state, so tests can vary bounds without interference.
#[derive(Debug, Clone, Copy)]
pub struct RotationTuning {
    /// Bound on any timed burst and on a whole auto-rotate attempt, seconds
    pub max_rotation_secs: f64,
    /// Auto-rotate declares arrival within this distance of the target
    pub arrival_tolerance_deg: f64,
    /// Remaining error below this hands the monitor loop over to the stop sequence
    pub monitor_cutoff_deg: f64,
    /// How long a position query waits for the first valid reading
    pub query_timeout: Duration,
    /// Quiescence window confirming the dome has fully stopped
    pub verify_window: Duration,
    /// Telemetry poll granularity during monitor and verify loops
    pub poll_interval: Duration,
    /// Delay between the stop-right and stop-left tokens
    pub settle_delay: Duration,
    /// Floor on the open-loop burst duration, seconds
    pub min_burst_secs: f64,
    /// Azimuth change below this does not count as movement during verify
    pub movement_epsilon_deg: f64,
}

impl Default for RotationTuning {
    fn default() -> Self {
        RotationTuning {
            max_rotation_secs: 10.0,
            arrival_tolerance_deg: 3.0,
            monitor_cutoff_deg: 5.0,
            query_timeout: Duration::from_secs(10),
            verify_window: Duration::from_secs(4),
            poll_interval: Duration::from_millis(100),
            settle_delay: Duration::from_secs(2),
            min_burst_secs: 2.0,
            movement_epsilon_deg: 0.25,
        }
    }
}
