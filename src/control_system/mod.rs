pub mod duration_planner;
pub mod emergency_coordinator;
pub mod orchestrator;
pub mod signal_state;

pub use duration_planner::GreenDurationPlanner;
pub use emergency_coordinator::{EmergencyOverrideCoordinator, ResolveOutcome, SubmitOutcome};
pub use orchestrator::{
    run_tick_loop, IntersectionOrchestrator, OverrideDecision, SharedOrchestrator,
};
pub use signal_state::{LaneSignalStateMachine, SignalExpiry};
