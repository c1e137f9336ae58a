//! Closed-loop rotation to a target azimuth
//!
//! State machine: `QUERY_INITIAL -> (ARRIVED | BURST_ROTATE) -> MONITOR ->
//! STOPPING -> VERIFY_STOP -> DONE`, with failure reachable from any state on
//! a transport error (the session issues a best-effort stop before the error
//! surfaces).
//!
//! The open-loop burst uses a deliberately conservative half-distance
//! estimate so the first pass undershoots rather than overshoots; the monitor
//! loop then watches telemetry until the remaining error drops under the
//! cutoff or the dome has covered the planned distance.

use crate::error::{Error, Result};
use crate::protocol::commands::Direction;
use crate::rotation::angles;
use crate::rotation::session::RotationSession;
use std::time::{Duration, Instant};

/// Immutable snapshot of one rotation attempt, gating the monitor loop
#[derive(Debug, Clone, Copy)]
pub struct MonitorWindow {
    pub target_deg: f64,
    pub initial_deg: f64,
    pub direction: Direction,
    /// Planned travel; covering it means the dome has gone far enough
    pub planned_distance_deg: f64,
    /// Remaining error below this hands over to the stop sequence
    pub cutoff_deg: f64,
    /// Hard bound on the whole attempt
    pub max_duration: Duration,
}

impl MonitorWindow {
    /// Pure continuation predicate for the monitor loop
    ///
    /// Keeps rotating while the remaining modulo-360 error is at least the
    /// cutoff, the dome has not yet covered the planned distance (runaway
    /// prevention), and the attempt is within its time bound.
    pub fn should_continue(&self, current_deg: f64, elapsed: Duration) -> bool {
        let remaining = angles::separation(current_deg, self.target_deg);
        let traveled = angles::traveled(self.initial_deg, current_deg, self.direction);
        remaining >= self.cutoff_deg
            && traveled < self.planned_distance_deg
            && elapsed < self.max_duration
    }
}

/// Result of a completed auto-rotate attempt
#[derive(Debug, Clone, Copy)]
pub struct RotationOutcome {
    /// Azimuth reported after the dome settled
    pub final_azimuth_deg: f64,
    /// False when the dome was already within tolerance and never moved
    pub moved: bool,
}

/// Rotate the dome to `target_deg` using position feedback
pub fn rotate_to_azimuth(session: &mut RotationSession, target_deg: f64) -> Result<RotationOutcome> {
    if !target_deg.is_finite() || !(0.0..360.0).contains(&target_deg) {
        return Err(Error::InvalidTarget(target_deg));
    }
    let tuning = *session.tuning();

    // QUERY_INITIAL
    let initial = session.query_azimuth()?;
    let path = angles::shortest_path(initial, target_deg);
    log::info!(
        "Auto-rotate: initial={:.1}°, target={:.1}°, going {} {:.1}°",
        initial,
        target_deg,
        path.direction,
        path.distance_deg
    );

    // ARRIVED
    if path.distance_deg < tuning.arrival_tolerance_deg {
        log::info!(
            "Already within {:.1}° of target; no motor command issued",
            tuning.arrival_tolerance_deg
        );
        return Ok(RotationOutcome {
            final_azimuth_deg: initial,
            moved: false,
        });
    }

    // BURST_ROTATE: half the remaining distance as seconds, floored and
    // capped, so the first pass lands short of the target
    let burst_secs = ((path.distance_deg - tuning.arrival_tolerance_deg) / 2.0)
        .max(tuning.min_burst_secs)
        .min(tuning.max_rotation_secs);
    let attempt_start = Instant::now();
    session.rotate_for(path.direction, burst_secs)?;

    // MONITOR
    let window = MonitorWindow {
        target_deg,
        initial_deg: initial,
        direction: path.direction,
        planned_distance_deg: path.distance_deg,
        cutoff_deg: tuning.monitor_cutoff_deg,
        max_duration: Duration::from_secs_f64(tuning.max_rotation_secs),
    };
    let mut current = initial;
    if let Some(raw) = session.drain_azimuth()? {
        current = angles::normalize_reading(raw)?;
    }
    while window.should_continue(current, attempt_start.elapsed()) {
        std::thread::sleep(tuning.poll_interval);
        if let Some(raw) = session.poll_azimuth()? {
            current = angles::normalize_reading(raw)?;
        }
    }
    log::debug!(
        "Monitor loop done at {:.1}° after {:.2?}",
        current,
        attempt_start.elapsed()
    );

    // STOPPING
    session.stop_channel(path.direction)?;
    session.discard_telemetry()?;

    // VERIFY_STOP
    verify_stopped(session, path.direction, current)?;

    // DONE
    let final_azimuth = session.query_azimuth()?;
    log::info!("Auto-rotate complete at {:.1}°", final_azimuth);
    Ok(RotationOutcome {
        final_azimuth_deg: final_azimuth,
        moved: true,
    })
}

/// Observe the link until one full quiescence window passes with no movement
///
/// A position packet differing from the last observed azimuth by more than
/// the movement epsilon reissues the stop and restarts the window.
fn verify_stopped(
    session: &mut RotationSession,
    direction: Direction,
    last_seen_deg: f64,
) -> Result<()> {
    let tuning = *session.tuning();
    let mut last = last_seen_deg;
    let mut window_start = Instant::now();
    loop {
        if window_start.elapsed() >= tuning.verify_window {
            return Ok(());
        }
        std::thread::sleep(tuning.poll_interval);
        if let Some(raw) = session.poll_azimuth()? {
            let azimuth = angles::normalize_reading(raw)?;
            if angles::separation(azimuth, last) > tuning.movement_epsilon_deg {
                log::warn!(
                    "Dome still moving during quiescence window ({:.1}° -> {:.1}°); reissuing stop",
                    last,
                    azimuth
                );
                session.stop_channel(direction)?;
                window_start = Instant::now();
            }
            last = azimuth;
        }
    }
}
