//! # Tank Executable Parameters
//!
//! This module provide parameters for the tank executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;
use thiserror::Error;

use crate::{auto_mgr::AutonId, sim::SimParams};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Longest accepted autonomous period.
///
/// Units: seconds
pub const MAX_AUTON_PERIOD_S: f64 = 600.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, Deserialize)]
pub struct TankExecParams {

    /// Routine to run if none is given on the command line.
    #[serde(default)]
    pub auton: AutonId,

    /// Length of the autonomous period, the routine is aborted if it runs over.
    ///
    /// Units: seconds
    pub auton_period_s: f64,

    /// Period of one operator control cycle.
    ///
    /// Units: milliseconds
    pub driver_period_ms: u64,

    /// Simulated motor plant.
    #[serde(default)]
    pub sim: SimParams
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum TankExecParamsError {
    #[error("The autonomous period must be positive and at most 600 s, found {0}")]
    InvalidAutonPeriod(f64),

    #[error("The driver period must be at least 1 ms")]
    ZeroDriverPeriod,

    #[error("The simulation step must be a positive number, found {0} s")]
    InvalidSimStep(f64),

    #[error("The simulation time constant must be a non-negative number, found {0} s")]
    InvalidSimTimeConst(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TankExecParams {
    /// Determines if the parameters are valid.
    pub fn are_valid(&self) -> Result<(), TankExecParamsError> {
        if !(self.auton_period_s > 0.0 && self.auton_period_s <= MAX_AUTON_PERIOD_S) {
            return Err(TankExecParamsError::InvalidAutonPeriod(self.auton_period_s));
        }

        if self.driver_period_ms == 0 {
            return Err(TankExecParamsError::ZeroDriverPeriod);
        }

        if !(self.sim.step_s > 0.0 && self.sim.step_s.is_finite()) {
            return Err(TankExecParamsError::InvalidSimStep(self.sim.step_s));
        }

        if !(self.sim.time_const_s >= 0.0 && self.sim.time_const_s.is_finite()) {
            return Err(TankExecParamsError::InvalidSimTimeConst(self.sim.time_const_s));
        }

        Ok(())
    }
}
