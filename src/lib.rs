//! DomeIO - Ground controller for a rotating observatory dome
//!
//! Converts an operator-supplied target heading or a scheduled observation
//! plan into motor-drive commands over the dome controller's serial link, and
//! parses position telemetry from the same link to close the loop on actual
//! dome position.

pub mod config;
pub mod error;
pub mod protocol;
pub mod rotation;
pub mod schedule;
pub mod transport;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
pub use protocol::commands::Direction;
pub use rotation::controller::{rotate_to_azimuth, RotationOutcome};
pub use rotation::session::RotationSession;
pub use rotation::RotationTuning;
pub use schedule::{ObservationPlan, PlanEntry, ScheduleExecutor};
