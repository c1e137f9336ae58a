//! Motor command encoding
//!
//! Logical directives map to fixed command tokens on the wire:
//!
//! | Directive        | Token |
//! |------------------|-------|
//! | begin-left       | `DLO` |
//! | stop-left        | `DLo` |
//! | begin-right      | `DRO` |
//! | stop-right       | `DRo` |
//! | request-position | `RDP` |
//!
//! Left and right are separate relay channels on the dome controller; the
//! full stop sequence releases both (stop-right, settle, stop-left).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rotation direction
///
/// Right increases the azimuth angle (clockwise as seen from above), Left
/// decreases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
        }
    }
}

/// Logical directives understood by the dome motor controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorCommand {
    BeginLeft,
    BeginRight,
    StopLeft,
    StopRight,
    QueryPosition,
}

impl MotorCommand {
    /// Begin directive for a rotation channel
    pub fn begin(direction: Direction) -> Self {
        match direction {
            Direction::Left => MotorCommand::BeginLeft,
            Direction::Right => MotorCommand::BeginRight,
        }
    }

    /// Stop directive for a rotation channel
    pub fn stop(direction: Direction) -> Self {
        match direction {
            Direction::Left => MotorCommand::StopLeft,
            Direction::Right => MotorCommand::StopRight,
        }
    }

    /// Fixed wire token for this directive
    pub fn token(self) -> &'static [u8] {
        match self {
            MotorCommand::BeginLeft => b"DLO",
            MotorCommand::BeginRight => b"DRO",
            MotorCommand::StopLeft => b"DLo",
            MotorCommand::StopRight => b"DRo",
            MotorCommand::QueryPosition => b"RDP",
        }
    }
}

/// Validate a timed-burst duration against the configured bound
///
/// Accepts the inclusive range `[0, max_seconds]`, matching the plan-entry
/// contract.
pub fn validate_burst_duration(seconds: f64, max_seconds: f64) -> Result<()> {
    if !seconds.is_finite() || seconds < 0.0 || seconds > max_seconds {
        return Err(Error::InvalidDuration {
            requested: seconds,
            max: max_seconds,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_tokens() {
        assert_eq!(MotorCommand::BeginLeft.token(), b"DLO");
        assert_eq!(MotorCommand::StopLeft.token(), b"DLo");
        assert_eq!(MotorCommand::BeginRight.token(), b"DRO");
        assert_eq!(MotorCommand::StopRight.token(), b"DRo");
        assert_eq!(MotorCommand::QueryPosition.token(), b"RDP");
    }

    #[test]
    fn test_direction_mapping() {
        assert_eq!(MotorCommand::begin(Direction::Left), MotorCommand::BeginLeft);
        assert_eq!(MotorCommand::begin(Direction::Right), MotorCommand::BeginRight);
        assert_eq!(MotorCommand::stop(Direction::Left), MotorCommand::StopLeft);
        assert_eq!(MotorCommand::stop(Direction::Right), MotorCommand::StopRight);
    }

    #[test]
    fn test_burst_duration_bounds() {
        assert!(validate_burst_duration(0.0, 10.0).is_ok());
        assert!(validate_burst_duration(2.0, 10.0).is_ok());
        assert!(validate_burst_duration(10.0, 10.0).is_ok());

        assert!(matches!(
            validate_burst_duration(-0.1, 10.0),
            Err(crate::error::Error::InvalidDuration { .. })
        ));
        assert!(validate_burst_duration(10.1, 10.0).is_err());
        assert!(validate_burst_duration(f64::NAN, 10.0).is_err());
        assert!(validate_burst_duration(f64::INFINITY, 10.0).is_err());
    }

    #[test]
    fn test_direction_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Direction::Left).unwrap(), "\"left\"");
        let d: Direction = serde_json::from_str("\"right\"").unwrap();
        assert_eq!(d, Direction::Right);
        assert!(serde_json::from_str::<Direction>("\"up\"").is_err());
    }
}
