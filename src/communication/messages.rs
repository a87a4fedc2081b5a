use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::detection::DetectionReport;
use crate::models::emergency::EmergencyAlert;
use crate::models::status::IntersectionStatus;

/// Envelope pushed to status subscribers. Serializes as
/// `{"type": ..., "data": ..., "timestamp": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum TrafficEventKind {
    IntersectionStatus(IntersectionStatus),
    VehicleDetection(DetectionReport),
    EmergencyAlert(EmergencyAlert),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficEvent {
    #[serde(flatten)]
    pub kind: TrafficEventKind,
    pub timestamp: DateTime<Utc>,
}

impl TrafficEvent {
    pub fn now(kind: TrafficEventKind) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lane::LaneCounts;

    #[test]
    fn detection_event_serializes_with_type_tag() {
        let report = DetectionReport::new(LaneCounts::new(1, 2, 3, 4), false);
        let event = TrafficEvent::now(TrafficEventKind::VehicleDetection(report));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "vehicle_detection");
        assert_eq!(json["data"]["total_vehicles"], 10);
        assert!(json["timestamp"].is_string());
    }
}
