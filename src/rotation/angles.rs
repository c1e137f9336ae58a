//! Modulo-360 azimuth arithmetic

use crate::error::{Error, Result};
use crate::protocol::commands::Direction;

/// Lower bound on a raw reading the position encoder may report
pub const RAW_READING_MIN: f64 = -2.0;
/// Upper bound on a raw reading the position encoder may report
pub const RAW_READING_MAX: f64 = 362.0;

/// Reduce an angle to [0, 360)
pub fn wrap_degrees(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

/// Validate and normalize a raw azimuth reading
///
/// The dome's position encoder occasionally reports -1 or 361 for headings
/// near north; both fold to 1. Values outside [-2, 362] are rejected rather
/// than defaulted.
pub fn normalize_reading(raw: f64) -> Result<f64> {
    if !raw.is_finite() || !(RAW_READING_MIN..=RAW_READING_MAX).contains(&raw) {
        return Err(Error::ReadingOutOfRange(raw));
    }
    if raw == -1.0 || raw == 361.0 {
        return Ok(1.0);
    }
    Ok(wrap_degrees(raw))
}

/// Shortest rotation from one heading to another
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationPath {
    pub direction: Direction,
    pub distance_deg: f64,
}

/// Pick the direction needing less rotation, ties toward Right
pub fn shortest_path(initial_deg: f64, target_deg: f64) -> RotationPath {
    let right = wrap_degrees(target_deg - initial_deg);
    let left = wrap_degrees(initial_deg - target_deg);
    if right <= left {
        RotationPath {
            direction: Direction::Right,
            distance_deg: right,
        }
    } else {
        RotationPath {
            direction: Direction::Left,
            distance_deg: left,
        }
    }
}

/// Angular distance covered moving from `from` to `to` in `direction`
pub fn traveled(from_deg: f64, to_deg: f64, direction: Direction) -> f64 {
    match direction {
        Direction::Right => wrap_degrees(to_deg - from_deg),
        Direction::Left => wrap_degrees(from_deg - to_deg),
    }
}

/// Smallest absolute separation between two headings
pub fn separation(a_deg: f64, b_deg: f64) -> f64 {
    let d = wrap_degrees(a_deg - b_deg);
    d.min(360.0 - d)
}
