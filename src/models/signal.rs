use serde::{Deserialize, Serialize};

use crate::models::lane::LaneDirection;

/// Traffic signal states. The flashing variants are degraded/manual
/// modes and are never entered by the adaptive cycle itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalState {
    Red,
    Yellow,
    Green,
    FlashingRed,
    FlashingYellow,
}

impl SignalState {
    /// Whether the signal allows traffic flow.
    pub fn allows_flow(self) -> bool {
        self == SignalState::Green
    }

    pub fn is_flashing(self) -> bool {
        matches!(self, SignalState::FlashingRed | SignalState::FlashingYellow)
    }
}

/// State and timing of one lane's signal head. Owned exclusively by the
/// lane's state machine; mutated only through `advance` and `force_set`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficSignal {
    pub lane: LaneDirection,
    pub current_state: SignalState,
    /// Seconds until the current phase expires. Never negative.
    pub remaining_time: f64,
    pub next_state: Option<SignalState>,
    /// Duration the current phase was committed with, in whole seconds.
    pub cycle_duration: u32,
}
