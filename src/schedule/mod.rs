//! Scheduled dome movement
//!
//! A plan is an ordered list of timestamped open-loop rotation actions,
//! validated wholesale before any hardware command goes out.

pub mod executor;
pub mod plan;

pub use executor::ScheduleExecutor;
pub use plan::{ObservationPlan, PlanEntry};
