//! Auxiliary actuator control
//!
//! The intake and conveyor are open loop actuators which are either driven
//! at full speed in one of two directions or stopped.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Demand for an auxiliary actuator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuxDem {
    /// Intake in or conveyor up.
    Forward,

    /// Intake out or conveyor down.
    Reverse,

    Stop
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AuxDem {
    /// Decode the demand from the actuator's two buttons. Forward wins if
    /// both are held.
    pub fn from_buttons(forward: bool, reverse: bool) -> Self {
        if forward {
            AuxDem::Forward
        }
        else if reverse {
            AuxDem::Reverse
        }
        else {
            AuxDem::Stop
        }
    }

    /// Direction of the demand, +1, -1 or 0.
    pub fn sign(&self) -> f64 {
        match self {
            AuxDem::Forward => 1.0,
            AuxDem::Reverse => -1.0,
            AuxDem::Stop => 0.0
        }
    }
}

impl Default for AuxDem {
    fn default() -> Self {
        AuxDem::Stop
    }
}
