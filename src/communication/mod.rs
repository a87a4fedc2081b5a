pub mod messages;

pub use messages::{TrafficEvent, TrafficEventKind};
