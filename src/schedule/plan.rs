//! Observation plan loading and validation

use crate::error::{Error, Result};
use crate::protocol::commands::Direction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One scheduled rotation action with an absolute execution deadline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanEntry {
    /// When to execute the action
    pub utc_timestamp: DateTime<Utc>,
    /// Which way to rotate
    pub direction: Direction,
    /// Open-loop burst length, seconds
    pub rotation_duration_sec: f64,
}

/// A validated, time-sorted sequence of plan entries
///
/// Construction is all-or-nothing: one bad entry rejects the whole plan, so
/// the executor never starts a partially valid run.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationPlan {
    entries: Vec<PlanEntry>,
}

impl ObservationPlan {
    /// Validate entries wholesale and sort them by deadline
    pub fn validate(mut entries: Vec<PlanEntry>, max_duration_sec: f64) -> Result<Self> {
        for (index, entry) in entries.iter().enumerate() {
            let d = entry.rotation_duration_sec;
            if !d.is_finite() || d < 0.0 || d > max_duration_sec {
                return Err(Error::Plan(format!(
                    "entry {}: rotation_duration_sec {} outside [0, {}]",
                    index, d, max_duration_sec
                )));
            }
        }
        entries.sort_by_key(|entry| entry.utc_timestamp);
        Ok(ObservationPlan { entries })
    }

    /// Load a plan from a JSON file
    ///
    /// The file holds an array of entries with exactly the fields
    /// `utc_timestamp`, `direction` (`left`/`right`), and
    /// `rotation_duration_sec`; anything else fails the whole load.
    pub fn from_file<P: AsRef<Path>>(path: P, max_duration_sec: f64) -> Result<Self> {
        let contents = std::fs::read_to_string(&path)?;
        let entries: Vec<PlanEntry> = serde_json::from_str(&contents)?;
        log::info!(
            "Loaded {} plan entries from {}",
            entries.len(),
            path.as_ref().display()
        );
        Self::validate(entries, max_duration_sec)
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(ts: &str, direction: Direction, secs: f64) -> PlanEntry {
        PlanEntry {
            utc_timestamp: ts.parse().unwrap(),
            direction,
            rotation_duration_sec: secs,
        }
    }

    #[test]
    fn test_validate_sorts_by_deadline() {
        let plan = ObservationPlan::validate(
            vec![
                entry("2026-08-29T03:00:00Z", Direction::Left, 2.0),
                entry("2026-08-29T01:00:00Z", Direction::Right, 3.0),
                entry("2026-08-29T02:00:00Z", Direction::Left, 1.0),
            ],
            10.0,
        )
        .unwrap();

        let hours: Vec<u32> = plan
            .entries()
            .iter()
            .map(|e| {
                use chrono::Timelike;
                e.utc_timestamp.hour()
            })
            .collect();
        assert_eq!(hours, vec![1, 2, 3]);
    }

    #[test]
    fn test_validate_rejects_whole_plan_on_bad_duration() {
        // One over-long entry poisons everything
        let result = ObservationPlan::validate(
            vec![
                entry("2026-08-29T01:00:00Z", Direction::Left, 2.0),
                entry("2026-08-29T02:00:00Z", Direction::Right, 10.5),
            ],
            10.0,
        );
        assert!(matches!(result, Err(Error::Plan(_))));

        let result = ObservationPlan::validate(
            vec![entry("2026-08-29T01:00:00Z", Direction::Left, -1.0)],
            10.0,
        );
        assert!(result.is_err());

        let result = ObservationPlan::validate(
            vec![entry("2026-08-29T01:00:00Z", Direction::Left, f64::NAN)],
            10.0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_accepts_inclusive_bounds() {
        let plan = ObservationPlan::validate(
            vec![
                entry("2026-08-29T01:00:00Z", Direction::Left, 0.0),
                entry("2026-08-29T02:00:00Z", Direction::Right, 10.0),
            ],
            10.0,
        );
        assert!(plan.is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let json = r#"[
            {"utc_timestamp": "2026-08-29T03:15:00Z", "direction": "left", "rotation_duration_sec": 3.0},
            {"utc_timestamp": "2026-08-29T03:10:00Z", "direction": "right", "rotation_duration_sec": 2.5}
        ]"#;
        let entries: Vec<PlanEntry> = serde_json::from_str(json).unwrap();
        let plan = ObservationPlan::validate(entries, 10.0).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.entries()[0].direction, Direction::Right);
        assert_eq!(
            plan.entries()[0].utc_timestamp,
            Utc.with_ymd_and_hms(2026, 8, 29, 3, 10, 0).unwrap()
        );
    }

    #[test]
    fn test_json_rejects_unknown_direction() {
        let json = r#"[{"utc_timestamp": "2026-08-29T03:15:00Z", "direction": "up", "rotation_duration_sec": 3.0}]"#;
        assert!(serde_json::from_str::<Vec<PlanEntry>>(json).is_err());
    }

    #[test]
    fn test_json_rejects_extra_columns() {
        let json = r#"[{"utc_timestamp": "2026-08-29T03:15:00Z", "direction": "left", "rotation_duration_sec": 3.0, "speed": 5}]"#;
        assert!(serde_json::from_str::<Vec<PlanEntry>>(json).is_err());
    }
}
