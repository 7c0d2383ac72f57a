//! Parameters structure for ManCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use super::ManCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for manual control.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Params {
    /// Axis magnitudes below this are treated as zero, so a joystick resting
    /// slightly off centre doesn't creep the drive.
    pub axis_deadband: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    pub fn are_valid(&self) -> Result<(), ManCtrlError> {
        if !(0.0..1.0).contains(&self.axis_deadband) {
            return Err(ManCtrlError::InvalidDeadband(self.axis_deadband));
        }

        Ok(())
    }
}
