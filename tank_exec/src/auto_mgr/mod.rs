//! # Autonomous manager
//!
//! Selects and runs the scripted autonomous routines. A routine is chosen once, before the
//! autonomous period starts, as an [`AutonId`]. Each routine is a list of [`AutoStep`]s executed
//! in order on the [`Robot`](crate::robot::Robot):
//!
//! - `MoveStraight` and `TurnAngle` block until the drive settles (see `DriveCtrl::drive_pid`).
//! - `Intake` and `Conveyor` set an auxiliary actuator and return immediately.
//! - `Wait` sleeps, leaving the actuators running as they were.
//!
//! Raising the robot's abort handle ends the routine at the next step or wait poll.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod routine;
mod state;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

pub use routine::*;
pub use state::*;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Autonomous routine selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutonId {
    None,
    Test,
    Left,
    MidLeft,
    Right,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AutoMgrError {
    #[error("Unknown autonomous routine \"{0}\", expected one of none, test, left, mid_left, right")]
    UnknownAuton(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl AutonId {
    pub const ALL: [AutonId; 5] = [
        AutonId::None,
        AutonId::Test,
        AutonId::Left,
        AutonId::MidLeft,
        AutonId::Right,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AutonId::None => "none",
            AutonId::Test => "test",
            AutonId::Left => "left",
            AutonId::MidLeft => "mid_left",
            AutonId::Right => "right",
        }
    }
}

impl Default for AutonId {
    fn default() -> Self {
        AutonId::None
    }
}

impl Display for AutonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for AutonId {
    type Err = AutoMgrError;

    /// Case insensitive, `-` is accepted in place of `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_lowercase().replace('-', "_");

        AutonId::ALL
            .iter()
            .find(|id| id.name() == norm)
            .copied()
            .ok_or_else(|| AutoMgrError::UnknownAuton(s.to_string()))
    }
}
