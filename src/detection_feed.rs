use rand::Rng;
use tokio::time::{sleep, Duration};

use crate::communication::messages::{TrafficEvent, TrafficEventKind};
use crate::control_system::orchestrator::SharedOrchestrator;
use crate::models::detection::DetectionReport;
use crate::models::emergency::{EmergencyAlert, EmergencyType};
use crate::models::lane::{LaneCounts, LaneDirection};
use crate::monitoring::status_broadcaster::StatusBroadcaster;

/// Stand-in for the vision collaborator: produces random per-lane
/// vehicle counts and the occasional emergency alert, already in the
/// validated shape the controller consumes.
pub fn random_report() -> DetectionReport {
    let mut rng = rand::rng();
    let counts = LaneCounts::new(
        rng.random_range(0..=20),
        rng.random_range(0..=20),
        rng.random_range(0..=20),
        rng.random_range(0..=20),
    );
    // Roughly one frame in twelve carries an emergency vehicle.
    let has_emergency = rng.random_range(0..12) == 0;
    DetectionReport::new(counts, has_emergency)
}

// A detection frame only says "an emergency vehicle is present"; the
// alert synthesized from it takes the configured override duration.
fn random_emergency_alert(override_secs: u32) -> EmergencyAlert {
    let mut rng = rand::rng();
    let lane = LaneDirection::ALL[rng.random_range(0..LaneDirection::ALL.len())];
    let emergency_type = match rng.random_range(0..4) {
        0 => EmergencyType::Ambulance,
        1 => EmergencyType::FireTruck,
        2 => EmergencyType::Police,
        _ => EmergencyType::Rescue,
    };
    EmergencyAlert::new(emergency_type, lane, rng.random_range(1..=5), override_secs)
}

/// Periodically feeds detections (and derived emergency alerts) into the
/// controller, mirroring what the real detection pipeline would do after
/// each analyzed frame.
pub async fn run_detection_feed(
    orchestrator: SharedOrchestrator,
    broadcaster: std::sync::Arc<StatusBroadcaster>,
    interval_secs: u64,
    override_secs: u32,
) {
    loop {
        sleep(Duration::from_secs(interval_secs)).await;
        let report = random_report();
        let emergency = report
            .has_emergency_vehicles
            .then(|| random_emergency_alert(override_secs));

        let update = {
            let mut controller = orchestrator.lock().unwrap();
            let update = controller.update_vehicle_counts(&report);
            if let Some(alert) = emergency.clone() {
                match controller.handle_emergency_override(alert) {
                    Ok(decision) => log::info!("simulated emergency alert: {:?}", decision),
                    Err(error) => log::error!("emergency submission failed: {}", error),
                }
            }
            update
        };
        match update {
            Ok(()) => {
                broadcaster
                    .broadcast(&TrafficEvent::now(TrafficEventKind::VehicleDetection(report)));
                if let Some(alert) = emergency {
                    broadcaster
                        .broadcast(&TrafficEvent::now(TrafficEventKind::EmergencyAlert(alert)));
                }
            }
            Err(error) => log::error!("detection update rejected: {}", error),
        }
    }
}
