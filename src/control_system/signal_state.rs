use crate::error::ControlError;
use crate::models::lane::LaneDirection;
use crate::models::signal::{SignalState, TrafficSignal};

/// Emitted when a phase countdown reaches zero. The machine never picks
/// the next state itself; that decision depends on global scheduling
/// policy and belongs to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalExpiry {
    pub lane: LaneDirection,
    pub expired_state: SignalState,
    /// Elapsed time left over past the boundary, to be applied to the
    /// next phase so no wall-clock time is lost.
    pub carryover: f64,
}

/// State machine for a single lane's signal head. Only the orchestrator
/// (and, through it, the emergency coordinator) may drive it.
#[derive(Debug, Clone)]
pub struct LaneSignalStateMachine {
    signal: TrafficSignal,
}

impl LaneSignalStateMachine {
    pub fn new(lane: LaneDirection) -> Self {
        Self {
            signal: TrafficSignal {
                lane,
                current_state: SignalState::Red,
                remaining_time: 0.0,
                next_state: None,
                cycle_duration: 1,
            },
        }
    }

    pub fn lane(&self) -> LaneDirection {
        self.signal.lane
    }

    pub fn state(&self) -> SignalState {
        self.signal.current_state
    }

    pub fn remaining_time(&self) -> f64 {
        self.signal.remaining_time
    }

    /// A copy of the owned signal, safe to hand to snapshot readers.
    pub fn signal(&self) -> TrafficSignal {
        self.signal.clone()
    }

    /// Decrements the countdown by `elapsed` seconds. Returns a boundary
    /// event when the phase expires; the remaining time never goes
    /// negative and any surplus elapsed time is reported as carryover.
    pub fn advance(&mut self, elapsed: f64) -> Option<SignalExpiry> {
        if elapsed <= 0.0 {
            return None;
        }
        let after = self.signal.remaining_time - elapsed;
        if after > 0.0 {
            self.signal.remaining_time = after;
            return None;
        }
        self.signal.remaining_time = 0.0;
        Some(SignalExpiry {
            lane: self.signal.lane,
            expired_state: self.signal.current_state,
            carryover: -after,
        })
    }

    /// Unconditional assignment of state and countdown, used by the
    /// orchestrator for every transition (cycle, clearance, override,
    /// degraded mode). A non-positive duration is a programming error.
    pub fn force_set(
        &mut self,
        state: SignalState,
        duration_secs: f64,
        next_state: Option<SignalState>,
    ) -> Result<(), ControlError> {
        if duration_secs <= 0.0 {
            return Err(ControlError::InvalidConfiguration(format!(
                "non-positive signal duration {} for lane '{}'",
                duration_secs, self.signal.lane
            )));
        }
        self.signal.current_state = state;
        self.signal.remaining_time = duration_secs;
        self.signal.next_state = next_state;
        self.signal.cycle_duration = duration_secs.ceil() as u32;
        Ok(())
    }

    /// Parks the signal at RED with no pending countdown. Used for lanes
    /// that are simply waiting their turn.
    pub fn hold_red(&mut self) {
        self.signal.current_state = SignalState::Red;
        self.signal.remaining_time = 0.0;
        self.signal.next_state = None;
    }
}
