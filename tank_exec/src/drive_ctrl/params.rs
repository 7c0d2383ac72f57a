//! Parameters structure for DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use thiserror::Error;

use crate::motor::{GroupParams, MAX_VOLTAGE_MV};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for drive control.
///
/// Fixed once the controller is built, there is no runtime retuning.
#[derive(Clone, Debug, Deserialize)]
pub struct Params {

    // ---- MOTORS ----

    /// Motors on the left side of the base.
    pub left: GroupParams,

    /// Motors on the right side of the base.
    pub right: GroupParams,

    // ---- GEOMETRY ----

    /// Units: inches
    pub wheel_diameter_in: f64,

    /// Distance between the left and right wheel contact lines.
    ///
    /// Units: inches
    pub base_width_in: f64,

    // ---- PID ----

    /// Proportional gain, shared by both sides and every motion.
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,

    /// A motion is complete once both sides' error is at or below this.
    ///
    /// Units: degrees
    #[serde(default = "default_settle_threshold_deg")]
    pub settle_threshold_deg: f64,

    /// The integral is zeroed while the error is below this.
    ///
    /// Units: degrees
    #[serde(default = "default_windup_threshold_deg")]
    pub windup_threshold_deg: f64,

    /// How the PID output is applied to the motors.
    #[serde(default)]
    pub output_mode: OutputMode,

    /// Units: milliseconds
    #[serde(default = "default_ctrl_period_ms")]
    pub ctrl_period_ms: u64,

    /// Optional limit on PID cycles per motion, unbounded if absent.
    #[serde(default)]
    pub max_iterations: Option<u64>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Actuation used for the PID output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Output in millivolts, limited to +/-12000.
    Voltage,
    /// Output in rpm, limited to the gearset's free speed.
    Velocity
}

#[derive(Debug, Error, PartialEq)]
pub enum ParamsError {
    #[error("Wheel diameter must be positive, found {0} in")]
    InvalidWheelDiameter(f64),

    #[error("Base width must be positive, found {0} in")]
    InvalidBaseWidth(f64),

    #[error("PID gains must be finite")]
    NonFiniteGains,

    #[error("Thresholds must be non-negative numbers (settle {0} deg, windup {1} deg)")]
    InvalidThreshold(f64, f64)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::Voltage
    }
}

impl OutputMode {
    /// Largest command magnitude for this mode given the side's free speed.
    pub fn limit(&self, max_rpm: f64) -> f64 {
        match self {
            OutputMode::Voltage => MAX_VOLTAGE_MV,
            OutputMode::Velocity => max_rpm
        }
    }
}

impl Params {

    /// Determines if the parameters are valid.
    pub fn are_valid(&self) -> Result<(), ParamsError> {
        if !(self.wheel_diameter_in > 0.0) {
            return Err(ParamsError::InvalidWheelDiameter(self.wheel_diameter_in));
        }

        if !(self.base_width_in > 0.0) {
            return Err(ParamsError::InvalidBaseWidth(self.base_width_in));
        }

        if ![self.k_p, self.k_i, self.k_d].iter().all(|k| k.is_finite()) {
            return Err(ParamsError::NonFiniteGains);
        }

        if !(self.settle_threshold_deg >= 0.0) || !(self.windup_threshold_deg >= 0.0) {
            return Err(ParamsError::InvalidThreshold(
                self.settle_threshold_deg,
                self.windup_threshold_deg
            ));
        }

        Ok(())
    }
}

fn default_settle_threshold_deg() -> f64 {
    5.0
}

fn default_windup_threshold_deg() -> f64 {
    10.0
}

fn default_ctrl_period_ms() -> u64 {
    20
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::motor::Gearset;

    const DRIVE_TOML: &str = r#"
        wheel_diameter_in = 4.0
        base_width_in = 12.75
        k_p = 60.0
        k_i = 0.05
        k_d = 55.0

        [left]
        ports = [13, 11]
        reversed = [false, false]
        gearset = "green"

        [right]
        ports = [10, 3]
        reversed = [true, true]
    "#;

    #[test]
    fn test_load_defaults() {
        let p: Params = util::params::parse(DRIVE_TOML).unwrap();

        assert_eq!(p.left.ports, vec![13, 11]);
        assert_eq!(p.right.reversed, vec![true, true]);
        assert_eq!(p.right.gearset, Gearset::Green);
        assert_eq!(p.settle_threshold_deg, 5.0);
        assert_eq!(p.windup_threshold_deg, 10.0);
        assert_eq!(p.output_mode, OutputMode::Voltage);
        assert_eq!(p.ctrl_period_ms, 20);
        assert_eq!(p.max_iterations, None);
        assert_eq!(p.are_valid(), Ok(()));
    }

    #[test]
    fn test_invalid() {
        let mut p: Params = util::params::parse(DRIVE_TOML).unwrap();
        p.wheel_diameter_in = 0.0;
        assert_eq!(p.are_valid(), Err(ParamsError::InvalidWheelDiameter(0.0)));

        p.wheel_diameter_in = 4.0;
        p.base_width_in = -1.0;
        assert_eq!(p.are_valid(), Err(ParamsError::InvalidBaseWidth(-1.0)));

        p.base_width_in = 12.75;
        p.k_d = std::f64::NAN;
        assert_eq!(p.are_valid(), Err(ParamsError::NonFiniteGains));

        p.k_d = 55.0;
        p.windup_threshold_deg = -10.0;
        assert_eq!(p.are_valid(), Err(ParamsError::InvalidThreshold(5.0, -10.0)));

        // NaN never compares within a threshold, so a motion could never end
        p.windup_threshold_deg = 10.0;
        p.settle_threshold_deg = std::f64::NAN;
        assert!(matches!(
            p.are_valid(),
            Err(ParamsError::InvalidThreshold(s, w)) if s.is_nan() && w == 10.0
        ));

        p.settle_threshold_deg = 0.0;
        assert_eq!(p.are_valid(), Ok(()));
    }
}
