//! Manual control module
//!
//! Maps the operator's controller to drive demands once per control cycle.
//! The auxiliary actuators poll their own buttons, see `aux_ctrl`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod controller;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use controller::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ManCtrl operation.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ManCtrlError {
    #[error("The {0} axis value is not a finite number")]
    NonFiniteAxis(&'static str),

    #[error("The axis deadband must be in [0, 1), got {0}")]
    InvalidDeadband(f64)
}
