use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::lane::{LaneCounts, LaneDirection};
use crate::models::signal::TrafficSignal;

/// Overall operating mode of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemStatus {
    Operational,
    Degraded,
}

/// Point-in-time snapshot of the whole intersection. Immutable value
/// object; a fresh copy is produced on every read, never a live
/// reference into controller state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionStatus {
    pub intersection_id: String,
    /// One signal per lane; constructed over the full lane enumeration.
    pub signals: BTreeMap<LaneDirection, TrafficSignal>,
    pub vehicle_counts: LaneCounts,
    pub total_vehicles: u32,
    pub emergency_mode_active: bool,
    pub system_status: SystemStatus,
    pub last_detection_time: Option<DateTime<Utc>>,
    pub generated_at: DateTime<Utc>,
}

impl IntersectionStatus {
    /// Structural equality ignoring the snapshot timestamp. Two reads
    /// with no intervening mutation must compare equal under this.
    pub fn same_state_as(&self, other: &IntersectionStatus) -> bool {
        self.intersection_id == other.intersection_id
            && self.signals == other.signals
            && self.vehicle_counts == other.vehicle_counts
            && self.total_vehicles == other.total_vehicles
            && self.emergency_mode_active == other.emergency_mode_active
            && self.system_status == other.system_status
            && self.last_detection_time == other.last_detection_time
    }
}
