use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ControlError;
use crate::models::lane::LaneDirection;

/// Tunables for the signal controller. Defaults mirror a typical urban
/// four-way deployment; every field can be overridden through a
/// `TRAFFIC_`-prefixed environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    pub intersection_id: String,
    /// Fixed round-robin order over the four lanes.
    pub rotation: [LaneDirection; 4],
    /// Baseline green duration before adaptive scaling, seconds.
    pub default_green_secs: u32,
    pub min_green_secs: u32,
    pub max_green_secs: u32,
    /// Additional green seconds granted per observed vehicle. The exact
    /// weighting is a deployment decision, hence a tunable.
    pub green_scale_factor: f64,
    pub yellow_secs: u32,
    /// Mandatory all-red safety margin between right-of-way changes.
    /// Applies to emergency preemptions as well.
    pub all_red_clearance_secs: u32,
    /// Override green duration for alerts synthesized from a bare
    /// emergency-presence detection, which carries no requested duration.
    pub emergency_override_secs: u32,
    pub tick_interval_secs: u64,
    pub status_push_interval_secs: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            intersection_id: "main_intersection".to_string(),
            rotation: LaneDirection::ALL,
            default_green_secs: 30,
            min_green_secs: 10,
            max_green_secs: 120,
            green_scale_factor: 1.0,
            yellow_secs: 3,
            all_red_clearance_secs: 2,
            emergency_override_secs: 60,
            tick_interval_secs: 1,
            status_push_interval_secs: 2,
        }
    }
}

impl ControllerConfig {
    /// Loads the default configuration with `TRAFFIC_*` environment
    /// overrides applied, e.g. `TRAFFIC_MAX_GREEN_SECS=90`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        override_from_env("TRAFFIC_DEFAULT_GREEN_SECS", &mut config.default_green_secs);
        override_from_env("TRAFFIC_MIN_GREEN_SECS", &mut config.min_green_secs);
        override_from_env("TRAFFIC_MAX_GREEN_SECS", &mut config.max_green_secs);
        override_from_env("TRAFFIC_GREEN_SCALE_FACTOR", &mut config.green_scale_factor);
        override_from_env("TRAFFIC_YELLOW_SECS", &mut config.yellow_secs);
        override_from_env(
            "TRAFFIC_ALL_RED_CLEARANCE_SECS",
            &mut config.all_red_clearance_secs,
        );
        override_from_env(
            "TRAFFIC_EMERGENCY_OVERRIDE_SECS",
            &mut config.emergency_override_secs,
        );
        override_from_env("TRAFFIC_TICK_INTERVAL_SECS", &mut config.tick_interval_secs);
        override_from_env(
            "TRAFFIC_STATUS_PUSH_INTERVAL_SECS",
            &mut config.status_push_interval_secs,
        );
        if let Ok(id) = env::var("TRAFFIC_INTERSECTION_ID") {
            if !id.trim().is_empty() {
                config.intersection_id = id;
            }
        }
        config
    }

    pub fn validate(&self) -> Result<(), ControlError> {
        if self.min_green_secs == 0 || self.max_green_secs == 0 {
            return Err(ControlError::InvalidConfiguration(
                "green duration bounds must be positive".to_string(),
            ));
        }
        if self.min_green_secs > self.max_green_secs {
            return Err(ControlError::InvalidConfiguration(format!(
                "min_green_secs {} exceeds max_green_secs {}",
                self.min_green_secs, self.max_green_secs
            )));
        }
        if self.yellow_secs == 0 {
            return Err(ControlError::InvalidConfiguration(
                "yellow_secs must be positive".to_string(),
            ));
        }
        if self.all_red_clearance_secs == 0 {
            return Err(ControlError::InvalidConfiguration(
                "all_red_clearance_secs must be positive".to_string(),
            ));
        }
        if self.emergency_override_secs == 0 {
            return Err(ControlError::InvalidConfiguration(
                "emergency_override_secs must be positive".to_string(),
            ));
        }
        if self.green_scale_factor < 0.0 {
            return Err(ControlError::InvalidConfiguration(
                "green_scale_factor must be non-negative".to_string(),
            ));
        }
        let mut seen = [false; 4];
        for lane in self.rotation {
            seen[lane.index()] = true;
        }
        if seen != [true; 4] {
            return Err(ControlError::InvalidConfiguration(
                "rotation must cover every lane exactly once".to_string(),
            ));
        }
        Ok(())
    }

    /// The lane served after `lane` in the configured rotation.
    pub fn next_lane_after(&self, lane: LaneDirection) -> LaneDirection {
        let position = self
            .rotation
            .iter()
            .position(|&l| l == lane)
            .unwrap_or(0);
        self.rotation[(position + 1) % self.rotation.len()]
    }
}

fn override_from_env<T: FromStr>(key: &str, target: &mut T) {
    if let Ok(raw) = env::var(key) {
        match raw.parse::<T>() {
            Ok(value) => *target = value,
            Err(_) => log::warn!("ignoring unparseable {}={:?}", key, raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ControllerConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_green_bounds() {
        let mut config = ControllerConfig::default();
        config.min_green_secs = 50;
        config.max_green_secs = 20;
        assert!(matches!(
            config.validate(),
            Err(ControlError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn rejects_zero_clearance() {
        let mut config = ControllerConfig::default();
        config.all_red_clearance_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_rotation_entries() {
        let mut config = ControllerConfig::default();
        config.rotation = [
            LaneDirection::North,
            LaneDirection::North,
            LaneDirection::East,
            LaneDirection::West,
        ];
        assert!(config.validate().is_err());
    }

    #[test]
    fn rotation_wraps_around() {
        let config = ControllerConfig::default();
        assert_eq!(
            config.next_lane_after(LaneDirection::West),
            LaneDirection::North
        );
        assert_eq!(
            config.next_lane_after(LaneDirection::North),
            LaneDirection::South
        );
    }
}
