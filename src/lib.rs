pub mod communication;
pub mod config;
pub mod control_system;
pub mod detection_feed;
pub mod error;
pub mod models;
pub mod monitoring;
