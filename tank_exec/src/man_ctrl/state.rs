//! Implementations for the ManCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};
use serde::Serialize;

// Internal
use super::{ControllerState, ManCtrlError, Params};
use util::{
    maths::{deadband, sym_clamp},
    module::State
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Manual control module state
#[derive(Default)]
pub struct ManCtrl {
    params: Params,

    pub(crate) report: StatusReport
}

/// Drive demands for the current cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ManDems {
    /// Normalised left side demand in [-1, 1].
    pub left: f64,

    /// Normalised right side demand in [-1, 1].
    pub right: f64
}

/// Status report for ManCtrl processing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct StatusReport {
    pub left_deadbanded: bool,
    pub right_deadbanded: bool,
    pub left_clamped: bool,
    pub right_clamped: bool
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for ManCtrl {
    type InitData = Params;
    type InitError = ManCtrlError;

    type InputData = ControllerState;
    type OutputData = ManDems;
    type StatusReport = StatusReport;
    type ProcError = ManCtrlError;

    fn init(&mut self, init_data: Self::InitData) 
        -> Result<(), Self::InitError> 
    {
        init_data.are_valid()?;
        self.params = init_data;

        info!(
            "ManCtrl initialised with axis deadband {}", 
            self.params.axis_deadband
        );

        Ok(())
    }

    /// Tank control: the left stick's vertical axis drives the left side and
    /// the right stick's drives the right side.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> 
    {
        self.report = StatusReport::default();

        let (left, left_deadbanded, left_clamped) = 
            self.shape_axis("left", input_data.left_y)?;
        let (right, right_deadbanded, right_clamped) = 
            self.shape_axis("right", input_data.right_y)?;

        self.report.left_deadbanded = left_deadbanded;
        self.report.left_clamped = left_clamped;
        self.report.right_deadbanded = right_deadbanded;
        self.report.right_clamped = right_clamped;

        let dems = ManDems { left, right };

        trace!("ManCtrl dems: {:?}", dems);

        Ok((dems, self.report))
    }
}

impl ManCtrl {
    /// Apply the deadband and limit an axis to [-1, 1].
    ///
    /// Returns the shaped value and whether it was deadbanded or clamped.
    fn shape_axis(&self, name: &'static str, value: f64) 
        -> Result<(f64, bool, bool), ManCtrlError> 
    {
        if !value.is_finite() {
            return Err(ManCtrlError::NonFiniteAxis(name));
        }

        let clamped = sym_clamp(value, 1.0);
        let shaped = deadband(clamped, self.params.axis_deadband);

        Ok((
            shaped, 
            shaped == 0.0 && value != 0.0, 
            clamped != value
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn man_ctrl(axis_deadband: f64) -> ManCtrl {
        let mut m = ManCtrl::default();
        m.init(Params { axis_deadband }).unwrap();
        m
    }

    #[test]
    fn test_init() {
        let mut m = ManCtrl::default();
        assert_eq!(
            m.init(Params { axis_deadband: 1.0 }),
            Err(ManCtrlError::InvalidDeadband(1.0))
        );
        assert_eq!(
            m.init(Params { axis_deadband: -0.1 }),
            Err(ManCtrlError::InvalidDeadband(-0.1))
        );
        assert!(m.init(Params { axis_deadband: 0.05 }).is_ok());
    }

    #[test]
    fn test_proc() {
        let mut m = man_ctrl(0.05);

        let input = ControllerState {
            left_x: 0.9,
            left_y: 0.5,
            right_y: -0.75,
            ..Default::default()
        };
        let (dems, report) = m.proc(&input).unwrap();
        assert_eq!(dems, ManDems { left: 0.5, right: -0.75 });
        assert_eq!(report, StatusReport::default());

        let input = ControllerState {
            left_y: 0.02,
            right_y: 1.5,
            ..Default::default()
        };
        let (dems, report) = m.proc(&input).unwrap();
        assert_eq!(dems, ManDems { left: 0.0, right: 1.0 });
        assert!(report.left_deadbanded);
        assert!(report.right_clamped);
        assert!(!report.left_clamped);
        assert!(!report.right_deadbanded);
    }

    #[test]
    fn test_non_finite() {
        let mut m = man_ctrl(0.0);

        let input = ControllerState {
            right_y: f64::NAN,
            ..Default::default()
        };
        assert_eq!(m.proc(&input), Err(ManCtrlError::NonFiniteAxis("right")));
    }
}
