pub mod detection;
pub mod emergency;
pub mod lane;
pub mod signal;
pub mod status;

pub use detection::DetectionReport;
pub use emergency::{EmergencyAlert, EmergencyType};
pub use lane::{LaneCounts, LaneDirection};
pub use signal::{SignalState, TrafficSignal};
pub use status::{IntersectionStatus, SystemStatus};
