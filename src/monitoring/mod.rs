pub mod status_broadcaster;

pub use status_broadcaster::StatusBroadcaster;
