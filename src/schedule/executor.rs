//! Scheduled-movement executor
//!
//! Walks a validated, time-sorted plan, sleeping to each deadline and issuing
//! the entry's open-loop burst. A failed action is reported and the run
//! continues; cancellation and errors alike funnel through one final stop of
//! both channels before the transport is released.

use crate::error::{Error, Result};
use crate::rotation::session::RotationSession;
use crate::schedule::plan::{ObservationPlan, PlanEntry};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Granularity of deadline sleeps; bounds how long a cancellation can go unseen
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Executes an observation plan over one rotation session
pub struct ScheduleExecutor {
    session: RotationSession,
    cancel: Arc<AtomicBool>,
}

impl ScheduleExecutor {
    pub fn new(session: RotationSession, cancel: Arc<AtomicBool>) -> Self {
        ScheduleExecutor { session, cancel }
    }

    /// Run the plan to completion
    ///
    /// The dome is commanded to stop exactly once on the way out, whatever
    /// the exit path (completion, per-run error, or operator cancellation).
    pub fn run(mut self, plan: &ObservationPlan) -> Result<()> {
        let result = self.run_entries(plan);
        match self.session.stop_all() {
            Ok(()) => result,
            Err(stop_err) => {
                log::error!("Final stop failed: {}", stop_err);
                // A run error takes precedence over the stop failure
                result?;
                Err(stop_err)
            }
        }
    }

    fn run_entries(&mut self, plan: &ObservationPlan) -> Result<()> {
        let start = Utc::now();
        let pending: Vec<&PlanEntry> = plan
            .entries()
            .iter()
            .filter(|entry| {
                if entry.utc_timestamp < start {
                    log::warn!(
                        "Skipping past-due entry scheduled for {}",
                        entry.utc_timestamp
                    );
                    false
                } else {
                    true
                }
            })
            .collect();
        log::info!(
            "Executing {} of {} scheduled actions",
            pending.len(),
            plan.len()
        );

        for entry in pending {
            let wait = entry.utc_timestamp - Utc::now();
            match wait.to_std() {
                Err(_) => {
                    // Deadline slipped past while earlier actions ran
                    log::warn!(
                        "Deadline {} already passed; skipping",
                        entry.utc_timestamp
                    );
                    continue;
                }
                Ok(remaining) => self.sleep_through(remaining)?,
            }

            log::info!(
                "Executing scheduled action: rotate {} for {:.1}s (deadline {})",
                entry.direction,
                entry.rotation_duration_sec,
                entry.utc_timestamp
            );
            if let Err(e) = self
                .session
                .rotate_for(entry.direction, entry.rotation_duration_sec)
            {
                log::error!("Scheduled rotation failed: {}; continuing with next entry", e);
            }
        }
        Ok(())
    }

    /// Sleep in slices, surfacing operator cancellation promptly
    fn sleep_through(&self, mut remaining: Duration) -> Result<()> {
        loop {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(Error::Cancelled);
            }
            if remaining.is_zero() {
                return Ok(());
            }
            let slice = remaining.min(SLEEP_SLICE);
            std::thread::sleep(slice);
            remaining = remaining.saturating_sub(slice);
        }
    }
}
