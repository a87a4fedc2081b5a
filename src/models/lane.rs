use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ControlError;

/// One of the four cardinal approach directions to the intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneDirection {
    North,
    South,
    East,
    West,
}

impl LaneDirection {
    /// Every lane, in the default rotation order.
    pub const ALL: [LaneDirection; 4] = [
        LaneDirection::North,
        LaneDirection::South,
        LaneDirection::East,
        LaneDirection::West,
    ];

    pub fn index(self) -> usize {
        match self {
            LaneDirection::North => 0,
            LaneDirection::South => 1,
            LaneDirection::East => 2,
            LaneDirection::West => 3,
        }
    }
}

impl fmt::Display for LaneDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LaneDirection::North => "north",
            LaneDirection::South => "south",
            LaneDirection::East => "east",
            LaneDirection::West => "west",
        };
        write!(f, "{}", name)
    }
}

/// Vehicle counts for all four lanes. Totality is guaranteed by
/// construction, so a "missing lane" cannot occur past the boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneCounts {
    pub north: u32,
    pub south: u32,
    pub east: u32,
    pub west: u32,
}

impl LaneCounts {
    pub fn new(north: u32, south: u32, east: u32, west: u32) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Validates raw collaborator input: all four lanes must be present
    /// and every count within the non-negative `u32` range.
    pub fn try_from_raw(raw: &HashMap<LaneDirection, i64>) -> Result<Self, ControlError> {
        let mut counts = LaneCounts::default();
        for lane in LaneDirection::ALL {
            let value = raw.get(&lane).ok_or_else(|| {
                ControlError::Validation(format!("lane counts missing lane '{}'", lane))
            })?;
            if *value < 0 {
                return Err(ControlError::Validation(format!(
                    "negative vehicle count {} for lane '{}'",
                    value, lane
                )));
            }
            let count = u32::try_from(*value).map_err(|_| {
                ControlError::Validation(format!(
                    "vehicle count {} for lane '{}' exceeds the supported range",
                    value, lane
                ))
            })?;
            counts.set(lane, count);
        }
        Ok(counts)
    }

    pub fn get(&self, lane: LaneDirection) -> u32 {
        match lane {
            LaneDirection::North => self.north,
            LaneDirection::South => self.south,
            LaneDirection::East => self.east,
            LaneDirection::West => self.west,
        }
    }

    pub fn set(&mut self, lane: LaneDirection, count: u32) {
        match lane {
            LaneDirection::North => self.north = count,
            LaneDirection::South => self.south = count,
            LaneDirection::East => self.east = count,
            LaneDirection::West => self.west = count,
        }
    }

    /// Saturates rather than wrapping if the per-lane counts sum past
    /// `u32::MAX`.
    pub fn total(&self) -> u32 {
        self.north
            .saturating_add(self.south)
            .saturating_add(self.east)
            .saturating_add(self.west)
    }
}
