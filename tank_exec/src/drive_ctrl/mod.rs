//! # Drive control module
//!
//! Drive control owns the two sides of the differential base. During
//! operator control it passes joystick values straight to each side, during
//! autonomous it converts distance and angle requests into encoder targets and
//! drives both sides onto them with a synchronised PID loop.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod pid;
mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use pid::*;
pub use state::*;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use thiserror::Error;

use crate::motor::ConfigError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Summary of a completed motion command.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MotionReport {
    /// How the motion ended.
    pub outcome: MotionOutcome,

    /// Number of PID cycles executed.
    pub iterations: u64,

    /// Units: degrees
    pub left_target_deg: f64,

    /// Units: degrees
    pub right_target_deg: f64,

    /// Error when the loop exited.
    ///
    /// Units: degrees
    pub left_error_deg: f64,

    /// Units: degrees
    pub right_error_deg: f64
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The way a motion command finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MotionOutcome {
    /// Both sides reached the settle threshold.
    Settled,

    /// The iteration cap was hit before both sides settled, usually a stalled
    /// or disconnected motor.
    IterationLimit,

    /// The abort handle was raised.
    Aborted,

    /// The requested output limit was not a positive number, nothing was
    /// driven.
    InvalidLimit
}

/// Errors raised while building the drive controller.
#[derive(Debug, Error)]
pub enum DriveCtrlError {
    #[error("Invalid drive parameters: {0}")]
    InvalidParams(#[from] ParamsError),

    #[error("Invalid drive motor configuration: {0}")]
    Config(#[from] ConfigError)
}

impl MotionReport {
    pub fn settled(&self) -> bool {
        self.outcome == MotionOutcome::Settled
    }
}
