use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use adaptive_traffic_control::communication::messages::{TrafficEvent, TrafficEventKind};
use adaptive_traffic_control::config::ControllerConfig;
use adaptive_traffic_control::control_system::orchestrator::IntersectionOrchestrator;
use adaptive_traffic_control::models::detection::DetectionReport;
use adaptive_traffic_control::models::emergency::{EmergencyAlert, EmergencyType};
use adaptive_traffic_control::models::lane::{LaneCounts, LaneDirection};
use adaptive_traffic_control::models::signal::SignalState;
use adaptive_traffic_control::monitoring::status_broadcaster::StatusBroadcaster;

fn shared_orchestrator() -> Arc<Mutex<IntersectionOrchestrator>> {
    Arc::new(Mutex::new(
        IntersectionOrchestrator::new(ControllerConfig::default()).unwrap(),
    ))
}

fn green_count(orchestrator: &Arc<Mutex<IntersectionOrchestrator>>) -> usize {
    let status = orchestrator.lock().unwrap().get_current_status();
    status
        .signals
        .values()
        .filter(|s| s.current_state == SignalState::Green)
        .count()
}

#[tokio::test]
async fn concurrent_producers_never_break_the_single_green_invariant() {
    let orchestrator = shared_orchestrator();

    let ticker = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            for _ in 0..300 {
                orchestrator.lock().unwrap().tick(0.7).unwrap();
                tokio::task::yield_now().await;
            }
        })
    };
    let detector = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            for round in 0..100u32 {
                let report = DetectionReport::new(
                    LaneCounts::new(round % 15, 3, round % 7, 1),
                    false,
                );
                orchestrator
                    .lock()
                    .unwrap()
                    .update_vehicle_counts(&report)
                    .unwrap();
                tokio::task::yield_now().await;
            }
        })
    };
    let emergencies = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            for priority in 1..=5u8 {
                let alert = EmergencyAlert::new(
                    EmergencyType::Police,
                    LaneDirection::East,
                    priority,
                    15,
                );
                orchestrator
                    .lock()
                    .unwrap()
                    .handle_emergency_override(alert)
                    .unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    ticker.await.unwrap();
    detector.await.unwrap();
    emergencies.await.unwrap();

    assert!(green_count(&orchestrator) <= 1);
    // Drain all remaining overrides; the cycle must come back to normal.
    for _ in 0..100 {
        orchestrator.lock().unwrap().tick(5.0).unwrap();
    }
    let status = orchestrator.lock().unwrap().get_current_status();
    assert!(!status.emergency_mode_active);
}

#[tokio::test]
async fn status_push_reaches_subscribers_and_sheds_dead_ones() {
    let orchestrator = shared_orchestrator();
    let broadcaster = Arc::new(StatusBroadcaster::new());

    let (_, mut live) = broadcaster.subscribe();
    let (_, dead) = broadcaster.subscribe();
    drop(dead);

    let status = orchestrator.lock().unwrap().get_current_status();
    broadcaster.broadcast(&TrafficEvent::now(TrafficEventKind::IntersectionStatus(
        status,
    )));

    let event = live.recv().await.expect("live subscriber got the push");
    match event.kind {
        TrafficEventKind::IntersectionStatus(status) => {
            assert_eq!(status.signals.len(), 4);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(broadcaster.subscriber_count(), 1);
}

#[test]
fn raw_detection_input_is_validated_at_the_boundary() {
    let mut raw: HashMap<LaneDirection, i64> = HashMap::new();
    raw.insert(LaneDirection::North, 9);
    raw.insert(LaneDirection::South, 1);
    raw.insert(LaneDirection::East, 2);
    // Missing west lane.
    assert!(DetectionReport::try_from_raw(&raw, false).is_err());

    raw.insert(LaneDirection::West, -1);
    assert!(DetectionReport::try_from_raw(&raw, false).is_err());

    raw.insert(LaneDirection::West, 0);
    let report = DetectionReport::try_from_raw(&raw, true).unwrap();
    assert_eq!(report.total_vehicles, 12);
    assert!(report.has_emergency_vehicles);
}

#[test]
fn snapshot_serializes_to_the_dashboard_shape() {
    let orchestrator = IntersectionOrchestrator::new(ControllerConfig::default()).unwrap();
    let status = orchestrator.get_current_status();
    let json = serde_json::to_value(&status).unwrap();
    assert_eq!(json["intersection_id"], "main_intersection");
    assert_eq!(json["signals"]["north"]["current_state"], "green");
    assert_eq!(json["signals"]["west"]["current_state"], "red");
    assert_eq!(json["system_status"], "operational");
    assert_eq!(json["emergency_mode_active"], false);
}
