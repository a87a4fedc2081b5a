use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::time::{sleep, Duration};
use uuid::Uuid;

use crate::config::ControllerConfig;
use crate::control_system::duration_planner::GreenDurationPlanner;
use crate::control_system::emergency_coordinator::{
    EmergencyOverrideCoordinator, ResolveOutcome, SubmitOutcome,
};
use crate::control_system::signal_state::LaneSignalStateMachine;
use crate::error::ControlError;
use crate::models::detection::DetectionReport;
use crate::models::emergency::EmergencyAlert;
use crate::models::lane::{LaneCounts, LaneDirection};
use crate::models::signal::{SignalState, TrafficSignal};
use crate::models::status::{IntersectionStatus, SystemStatus};

/// What the intersection grants right-of-way to once the current all-red
/// clearance interval elapses.
#[derive(Debug, Clone, PartialEq)]
enum PendingGrant {
    RoundRobin(LaneDirection),
    Override(EmergencyAlert),
}

impl PendingGrant {
    fn lane(&self) -> LaneDirection {
        match self {
            PendingGrant::RoundRobin(lane) => *lane,
            PendingGrant::Override(alert) => alert.detected_lane,
        }
    }
}

/// Current phase of the intersection-wide cycle. Exactly one lane is
/// counting down in every phase.
#[derive(Debug, Clone, PartialEq)]
enum CyclePhase {
    Green(LaneDirection),
    Yellow(LaneDirection),
    /// All lanes red; the grant's lane carries the clearance countdown.
    Clearance(PendingGrant),
    OverrideGreen { alert_id: Uuid, lane: LaneDirection },
    /// Flashing signals, no countdown. Ticks are ignored until recovery.
    Degraded,
}

/// How the orchestrator answered an emergency submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideDecision {
    Activated,
    Queued,
}

/// Top-level owner of the intersection. Composes the lane state
/// machines, the duration planner and the emergency coordinator, and
/// serializes every mutation behind one `&mut self` surface.
pub struct IntersectionOrchestrator {
    config: ControllerConfig,
    planner: GreenDurationPlanner,
    coordinator: EmergencyOverrideCoordinator,
    machines: [LaneSignalStateMachine; 4],
    phase: CyclePhase,
    /// Lane whose turn comes up when the normal rotation resumes after
    /// an override (or after degraded-mode recovery).
    resume_lane: LaneDirection,
    counts: LaneCounts,
    last_detection_time: Option<DateTime<Utc>>,
    system_status: SystemStatus,
}

impl IntersectionOrchestrator {
    /// Builds the controller and starts the cycle: the first lane of the
    /// configured rotation opens GREEN, everything else holds RED.
    pub fn new(config: ControllerConfig) -> Result<Self, ControlError> {
        config.validate()?;
        let planner = GreenDurationPlanner::from_config(&config);
        let machines = [
            LaneSignalStateMachine::new(LaneDirection::North),
            LaneSignalStateMachine::new(LaneDirection::South),
            LaneSignalStateMachine::new(LaneDirection::East),
            LaneSignalStateMachine::new(LaneDirection::West),
        ];
        let first_lane = config.rotation[0];
        let mut orchestrator = Self {
            resume_lane: first_lane,
            planner,
            coordinator: EmergencyOverrideCoordinator::new(),
            machines,
            phase: CyclePhase::Green(first_lane),
            counts: LaneCounts::default(),
            last_detection_time: None,
            system_status: SystemStatus::Operational,
            config,
        };
        orchestrator.grant_green(first_lane)?;
        Ok(orchestrator)
    }

    /// Merges a validated detection report into the last-known counts.
    /// An already-committed green duration is never shortened or
    /// extended retroactively; the new counts apply from the next plan.
    pub fn update_vehicle_counts(&mut self, report: &DetectionReport) -> Result<(), ControlError> {
        self.counts = report.lane_counts;
        self.last_detection_time = Some(report.detected_at);
        log::debug!(
            "vehicle counts updated: {} total, emergency present: {}",
            report.total_vehicles,
            report.has_emergency_vehicles
        );
        Ok(())
    }

    /// Admits an emergency alert. On acceptance the round-robin cycle is
    /// suspended and the preemption protocol starts: all red, hold for
    /// the clearance interval, then the alert's lane goes green.
    pub fn handle_emergency_override(
        &mut self,
        alert: EmergencyAlert,
    ) -> Result<OverrideDecision, ControlError> {
        let lane = alert.detected_lane;
        match self.coordinator.submit(alert)? {
            SubmitOutcome::PreemptNow(active) => {
                log::warn!(
                    "emergency override activated for lane '{}' (priority {})",
                    lane,
                    active.priority_level
                );
                if self.phase == CyclePhase::Degraded {
                    // Signals stay flashing; the override is served once
                    // an operator recovers the system.
                    return Ok(OverrideDecision::Activated);
                }
                self.remember_resume_point();
                self.begin_clearance(PendingGrant::Override(active))?;
                self.check_signal_consistency()?;
                Ok(OverrideDecision::Activated)
            }
            SubmitOutcome::Queued => {
                log::info!("emergency alert for lane '{}' queued behind active override", lane);
                Ok(OverrideDecision::Queued)
            }
        }
    }

    /// Explicitly resolves an alert before its timer runs out. For the
    /// active override this behaves exactly like natural expiry.
    pub fn resolve_emergency(&mut self, alert_id: Uuid) -> Result<(), ControlError> {
        let was_active = self
            .coordinator
            .active()
            .map(|a| a.alert_id == alert_id)
            .unwrap_or(false);
        let outcome = self.coordinator.resolve(alert_id)?;
        if was_active && self.phase != CyclePhase::Degraded {
            self.follow_up_override(outcome)?;
            self.check_signal_consistency()?;
        }
        Ok(())
    }

    /// Applies `elapsed` wall-clock seconds to the running phase,
    /// crossing as many phase boundaries as the elapsed time covers.
    /// Idempotent with respect to wall-clock time: a delayed invocation
    /// passes a larger elapsed value and no time is lost or repeated.
    pub fn tick(&mut self, elapsed: f64) -> Result<(), ControlError> {
        if elapsed <= 0.0 || self.phase == CyclePhase::Degraded {
            return Ok(());
        }
        let mut budget = elapsed;
        loop {
            let lane = match self.countdown_lane() {
                Some(lane) => lane,
                None => break,
            };
            let expiry = self.machine_mut(lane).advance(budget);
            match expiry {
                None => break,
                Some(expiry) => {
                    budget = expiry.carryover;
                    self.on_phase_expired()?;
                    if budget <= 0.0 {
                        break;
                    }
                }
            }
        }
        self.check_signal_consistency()
    }

    /// Deep, independent snapshot of the whole intersection.
    pub fn get_current_status(&self) -> IntersectionStatus {
        let mut signals: BTreeMap<LaneDirection, TrafficSignal> = BTreeMap::new();
        for lane in LaneDirection::ALL {
            signals.insert(lane, self.machine(lane).signal());
        }
        IntersectionStatus {
            intersection_id: self.config.intersection_id.clone(),
            signals,
            vehicle_counts: self.counts,
            total_vehicles: self.counts.total(),
            emergency_mode_active: self.coordinator.is_override_active(),
            system_status: self.system_status,
            last_detection_time: self.last_detection_time,
            generated_at: Utc::now(),
        }
    }

    /// Switches every signal head to the given flashing state and
    /// suspends the cycle. Only flashing states are legal here.
    pub fn enter_degraded_mode(&mut self, state: SignalState) -> Result<(), ControlError> {
        if !state.is_flashing() {
            return Err(ControlError::InvalidConfiguration(format!(
                "degraded mode requires a flashing state, got {:?}",
                state
            )));
        }
        self.remember_resume_point();
        for lane in LaneDirection::ALL {
            self.machine_mut(lane).force_set(state, 1.0, None)?;
        }
        self.phase = CyclePhase::Degraded;
        self.system_status = SystemStatus::Degraded;
        log::warn!("entering degraded mode: all signals {:?}", state);
        Ok(())
    }

    /// Recovers from degraded mode and restarts the normal rotation via
    /// a fresh clearance interval.
    pub fn exit_degraded_mode(&mut self) -> Result<(), ControlError> {
        if self.phase != CyclePhase::Degraded {
            return Ok(());
        }
        self.system_status = SystemStatus::Operational;
        let next = match self.coordinator.active().cloned() {
            Some(active) => PendingGrant::Override(active),
            None => PendingGrant::RoundRobin(self.resume_lane),
        };
        log::info!("exiting degraded mode, clearing toward lane '{}'", next.lane());
        self.begin_clearance(next)?;
        self.check_signal_consistency()
    }

    pub fn emergency_mode_active(&self) -> bool {
        self.coordinator.is_override_active()
    }

    pub fn queued_alerts(&self) -> usize {
        self.coordinator.queued_len()
    }

    pub fn resolved_alerts(&self) -> &[EmergencyAlert] {
        self.coordinator.resolved_history()
    }

    // ---- internal transitions -------------------------------------------

    fn machine(&self, lane: LaneDirection) -> &LaneSignalStateMachine {
        &self.machines[lane.index()]
    }

    fn machine_mut(&mut self, lane: LaneDirection) -> &mut LaneSignalStateMachine {
        &mut self.machines[lane.index()]
    }

    /// The lane carrying the countdown for the current phase.
    fn countdown_lane(&self) -> Option<LaneDirection> {
        match &self.phase {
            CyclePhase::Green(lane) | CyclePhase::Yellow(lane) => Some(*lane),
            CyclePhase::Clearance(grant) => Some(grant.lane()),
            CyclePhase::OverrideGreen { lane, .. } => Some(*lane),
            CyclePhase::Degraded => None,
        }
    }

    fn on_phase_expired(&mut self) -> Result<(), ControlError> {
        match self.phase.clone() {
            CyclePhase::Green(lane) => {
                let yellow = f64::from(self.config.yellow_secs);
                self.machine_mut(lane)
                    .force_set(SignalState::Yellow, yellow, Some(SignalState::Red))?;
                self.phase = CyclePhase::Yellow(lane);
                log::debug!("lane '{}' green expired, now yellow", lane);
            }
            CyclePhase::Yellow(lane) => {
                let next = self.config.next_lane_after(lane);
                self.begin_clearance(PendingGrant::RoundRobin(next))?;
            }
            CyclePhase::Clearance(grant) => match grant {
                PendingGrant::RoundRobin(lane) => {
                    self.grant_green(lane)?;
                }
                PendingGrant::Override(alert) => {
                    self.grant_override_green(&alert)?;
                }
            },
            CyclePhase::OverrideGreen { alert_id, .. } => {
                let outcome = self.coordinator.resolve(alert_id)?;
                self.follow_up_override(outcome)?;
            }
            CyclePhase::Degraded => {}
        }
        Ok(())
    }

    /// Normal-cycle green: duration planned from the last-known vehicle
    /// count for the lane.
    fn grant_green(&mut self, lane: LaneDirection) -> Result<(), ControlError> {
        let duration = self.planner.plan(i64::from(self.counts.get(lane)));
        for other in LaneDirection::ALL {
            if other != lane {
                self.machine_mut(other).hold_red();
            }
        }
        self.machine_mut(lane).force_set(
            SignalState::Green,
            f64::from(duration),
            Some(SignalState::Yellow),
        )?;
        self.phase = CyclePhase::Green(lane);
        log::info!("lane '{}' green for {}s (adaptive)", lane, duration);
        Ok(())
    }

    fn grant_override_green(&mut self, alert: &EmergencyAlert) -> Result<(), ControlError> {
        let lane = alert.detected_lane;
        for other in LaneDirection::ALL {
            if other != lane {
                self.machine_mut(other).hold_red();
            }
        }
        self.machine_mut(lane).force_set(
            SignalState::Green,
            f64::from(alert.override_duration),
            Some(SignalState::Red),
        )?;
        self.phase = CyclePhase::OverrideGreen {
            alert_id: alert.alert_id,
            lane,
        };
        log::warn!(
            "override green: lane '{}' for {}s (alert {})",
            lane,
            alert.override_duration,
            alert.alert_id
        );
        Ok(())
    }

    /// Forces every lane red and starts the clearance countdown on the
    /// lane that will receive right-of-way next. The clearance interval
    /// is a safety margin and applies to emergencies as well.
    fn begin_clearance(&mut self, grant: PendingGrant) -> Result<(), ControlError> {
        let clearance = f64::from(self.config.all_red_clearance_secs);
        for lane in LaneDirection::ALL {
            self.machine_mut(lane).hold_red();
        }
        let target = grant.lane();
        self.machine_mut(target)
            .force_set(SignalState::Red, clearance, Some(SignalState::Green))?;
        self.phase = CyclePhase::Clearance(grant);
        Ok(())
    }

    /// Captures where the normal rotation should pick up once overrides
    /// are done. Called only when leaving normal operation; overrides
    /// chained back to back keep the original resume point.
    fn remember_resume_point(&mut self) {
        match &self.phase {
            CyclePhase::Green(lane) | CyclePhase::Yellow(lane) => {
                self.resume_lane = self.config.next_lane_after(*lane);
            }
            CyclePhase::Clearance(PendingGrant::RoundRobin(lane)) => {
                self.resume_lane = *lane;
            }
            _ => {}
        }
    }

    fn follow_up_override(&mut self, outcome: ResolveOutcome) -> Result<(), ControlError> {
        match outcome {
            ResolveOutcome::ActivateNext(next) => {
                self.begin_clearance(PendingGrant::Override(next))?;
            }
            ResolveOutcome::ResumeNormal => {
                log::info!(
                    "emergency overrides cleared, resuming rotation at lane '{}'",
                    self.resume_lane
                );
                self.begin_clearance(PendingGrant::RoundRobin(self.resume_lane))?;
            }
            ResolveOutcome::RemovedQueued => {}
        }
        Ok(())
    }

    /// The safety invariant: at most one lane green, and none at all
    /// during clearance or degraded operation. A violation is a
    /// scheduling bug and must never be masked.
    fn check_signal_consistency(&self) -> Result<(), ControlError> {
        let green_lanes: Vec<LaneDirection> = LaneDirection::ALL
            .into_iter()
            .filter(|&lane| self.machine(lane).state() == SignalState::Green)
            .collect();
        let expected: Option<LaneDirection> = match &self.phase {
            CyclePhase::Green(lane) => Some(*lane),
            CyclePhase::OverrideGreen { lane, .. } => Some(*lane),
            _ => None,
        };
        match (expected, green_lanes.as_slice()) {
            (Some(lane), [only]) if *only == lane => Ok(()),
            (None, []) => Ok(()),
            _ => Err(ControlError::ConsistencyFault(format!(
                "green lanes {:?} inconsistent with phase {:?}",
                green_lanes, self.phase
            ))),
        }
    }
}

/// Shared handle: every entry point is serialized through this single
/// mutex, so mutations apply one at a time in arrival order.
pub type SharedOrchestrator = Arc<Mutex<IntersectionOrchestrator>>;

/// Dedicated 1 Hz-ish tick loop. The elapsed time is measured against
/// the wall clock before the lock is taken, so a delayed or contended
/// tick applies the real elapsed amount instead of a fixed step. Ticks
/// are never dropped and never double-counted.
pub async fn run_tick_loop(orchestrator: SharedOrchestrator, interval_secs: u64) {
    let mut last = Instant::now();
    loop {
        sleep(Duration::from_secs(interval_secs)).await;
        let now = Instant::now();
        let elapsed = now.duration_since(last).as_secs_f64();
        last = now;
        let result = {
            let mut controller = orchestrator.lock().unwrap();
            controller.tick(elapsed)
        };
        if let Err(error) = result {
            log::error!("tick failed: {}", error);
            if matches!(error, ControlError::ConsistencyFault(_)) {
                // The schedule itself is wrong; this must not be masked.
                panic!("signal consistency fault: {}", error);
            }
        }
    }
}
