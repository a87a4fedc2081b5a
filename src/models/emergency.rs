use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ControlError;
use crate::models::lane::LaneDirection;

/// Kind of emergency vehicle behind an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyType {
    Ambulance,
    FireTruck,
    Police,
    Rescue,
    Other,
}

/// An emergency preemption request. Created by the emergency
/// collaborator, owned by the coordinator for its active lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyAlert {
    pub alert_id: Uuid,
    pub emergency_type: EmergencyType,
    pub detected_lane: LaneDirection,
    /// 1 is the highest priority, 5 the lowest.
    pub priority_level: u8,
    /// Requested green time for the detected lane, in seconds.
    pub override_duration: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl EmergencyAlert {
    pub fn new(
        emergency_type: EmergencyType,
        detected_lane: LaneDirection,
        priority_level: u8,
        override_duration: u32,
    ) -> Self {
        Self {
            alert_id: Uuid::new_v4(),
            emergency_type,
            detected_lane,
            priority_level,
            override_duration,
            is_active: true,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    /// The core re-validates every alert; upstream validation is not
    /// trusted.
    pub fn validate(&self) -> Result<(), ControlError> {
        if !(1..=5).contains(&self.priority_level) {
            return Err(ControlError::Validation(format!(
                "priority_level {} outside [1, 5]",
                self.priority_level
            )));
        }
        if self.override_duration == 0 {
            return Err(ControlError::Validation(
                "override_duration must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Ordering key for the coordinator queue: highest priority first,
    /// ties broken by earliest creation.
    pub fn rank(&self) -> (u8, DateTime<Utc>) {
        (self.priority_level, self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_well_formed_alert() {
        let alert = EmergencyAlert::new(EmergencyType::Ambulance, LaneDirection::East, 1, 60);
        assert!(alert.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_priority() {
        let mut alert = EmergencyAlert::new(EmergencyType::Police, LaneDirection::North, 1, 60);
        alert.priority_level = 0;
        assert!(matches!(
            alert.validate(),
            Err(ControlError::Validation(_))
        ));
        alert.priority_level = 6;
        assert!(alert.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_duration() {
        let mut alert = EmergencyAlert::new(EmergencyType::FireTruck, LaneDirection::West, 2, 30);
        alert.override_duration = 0;
        assert!(alert.validate().is_err());
    }
}
