use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ControlError;
use crate::models::lane::{LaneCounts, LaneDirection};

/// The only shape the controller consumes from the detection
/// collaborator: per-lane vehicle counts plus an emergency flag.
/// Nothing about imagery or model internals crosses this boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub lane_counts: LaneCounts,
    pub total_vehicles: u32,
    pub has_emergency_vehicles: bool,
    pub detected_at: DateTime<Utc>,
}

impl DetectionReport {
    pub fn new(lane_counts: LaneCounts, has_emergency_vehicles: bool) -> Self {
        Self {
            lane_counts,
            total_vehicles: lane_counts.total(),
            has_emergency_vehicles,
            detected_at: Utc::now(),
        }
    }

    /// Boundary constructor for unvalidated collaborator output. Wrong
    /// keys or negative values are rejected before reaching the core.
    pub fn try_from_raw(
        raw_counts: &HashMap<LaneDirection, i64>,
        has_emergency_vehicles: bool,
    ) -> Result<Self, ControlError> {
        let lane_counts = LaneCounts::try_from_raw(raw_counts)?;
        Ok(Self::new(lane_counts, has_emergency_vehicles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_are_derived_from_counts() {
        let report = DetectionReport::new(LaneCounts::new(3, 1, 0, 2), false);
        assert_eq!(report.total_vehicles, 6);
        assert!(!report.has_emergency_vehicles);
    }

    #[test]
    fn rejects_incomplete_raw_counts() {
        let mut raw = HashMap::new();
        raw.insert(LaneDirection::North, 4);
        assert!(DetectionReport::try_from_raw(&raw, false).is_err());
    }
}
