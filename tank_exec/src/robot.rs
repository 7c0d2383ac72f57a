//! Robot owning context
//!
//! Holds every actuator controller so that the autonomous and operator phases
//! are handed the robot explicitly rather than reaching for globals.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;
use serde::Deserialize;

// Internal
use crate::abort::AbortHandle;
use crate::aux_ctrl::{self, Conveyor, Intake};
use crate::drive_ctrl::{self, DriveCtrl, DriveCtrlError};
use crate::man_ctrl::{self, ControllerState, ManCtrl, ManCtrlError};
use crate::motor::{ConfigError, MotorBackend};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for every component of the robot.
#[derive(Clone, Debug, Deserialize)]
pub struct RobotParams {
    pub drive: drive_ctrl::Params,
    pub intake: aux_ctrl::Params,
    pub conveyor: aux_ctrl::Params,
    pub man_ctrl: man_ctrl::Params
}

/// The robot's actuators and its manual control dispatcher.
pub struct Robot {
    pub drive: DriveCtrl,
    pub intake: Intake,
    pub conveyor: Conveyor,

    man_ctrl: ManCtrl
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RobotError {
    #[error("Could not build the drive: {0}")]
    Drive(#[from] DriveCtrlError),

    #[error("Could not build the intake: {0}")]
    Intake(ConfigError),

    #[error("Could not build the conveyor: {0}")]
    Conveyor(ConfigError),

    #[error("Could not initialise manual control: {0}")]
    ManCtrl(#[from] ManCtrlError)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Robot {
    /// Build the robot on the given backend.
    ///
    /// Every motor is opened through the same backend, so a port used by two
    /// components is rejected here.
    pub fn new(
        params: RobotParams, 
        backend: &mut dyn MotorBackend
    ) -> Result<Self, RobotError> {
        let drive = DriveCtrl::new(params.drive, backend)?;
        let intake = Intake::new(&params.intake, backend)
            .map_err(RobotError::Intake)?;
        let conveyor = Conveyor::new(&params.conveyor, backend)
            .map_err(RobotError::Conveyor)?;

        let mut man_ctrl = ManCtrl::default();
        man_ctrl.init(params.man_ctrl)?;

        info!("Robot initialised");

        Ok(Self {
            drive,
            intake,
            conveyor,
            man_ctrl
        })
    }

    /// Run one operator control cycle from the given controller state.
    pub fn driver_cycle(&mut self, controller: &ControllerState) 
        -> Result<man_ctrl::StatusReport, ManCtrlError> 
    {
        let (dems, report) = self.man_ctrl.proc(controller)?;

        self.drive.driver(dems.left, dems.right);
        self.intake.driver(controller);
        self.conveyor.driver(controller);

        Ok(report)
    }

    /// Stop every actuator.
    pub fn stop_all(&mut self) {
        self.drive.stop();
        self.intake.stop();
        self.conveyor.stop();
    }

    /// Handle aborting any motion in progress on the drive.
    pub fn abort_handle(&self) -> AbortHandle {
        self.drive.abort_handle()
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::man_ctrl::Button;
    use crate::sim::{SimBackend, SimParams};

    pub(crate) const ROBOT_TOML: &str = r#"
        [drive]
        wheel_diameter_in = 4.0
        base_width_in = 12.75
        k_p = 60.0
        k_i = 0.05
        k_d = 55.0
        ctrl_period_ms = 0
        max_iterations = 2000

        [drive.left]
        ports = [13, 11]
        reversed = [false, false]

        [drive.right]
        ports = [10, 3]
        reversed = [true, true]

        [intake]
        fwd_button = "L1"
        rev_button = "L2"

        [intake.group]
        ports = [18, 12]
        reversed = [false, true]

        [conveyor]
        fwd_button = "R1"
        rev_button = "R2"

        [conveyor.group]
        ports = [15]
        reversed = [true]

        [man_ctrl]
        axis_deadband = 0.05
    "#;

    /// A robot on an ideal simulated plant with no control period.
    pub(crate) fn sim_robot() -> (Robot, SimBackend) {
        let params: RobotParams = util::params::parse(ROBOT_TOML).unwrap();
        let mut backend = SimBackend::new(SimParams {
            time_const_s: 0.0,
            ..Default::default()
        });
        let robot = Robot::new(params, &mut backend).unwrap();
        (robot, backend)
    }

    #[test]
    fn test_new() {
        let (_robot, backend) = sim_robot();
        assert_eq!(backend.ports(), vec![3, 10, 11, 12, 13, 15, 18]);
    }

    #[test]
    fn test_shared_port() {
        let mut params: RobotParams = util::params::parse(ROBOT_TOML).unwrap();
        params.conveyor.group.ports = vec![12];

        let mut backend = SimBackend::new(SimParams::default());
        assert!(matches!(
            Robot::new(params, &mut backend),
            Err(RobotError::Conveyor(ConfigError::PortInUse(12)))
        ));
    }

    #[test]
    fn test_driver_cycle() {
        let (mut robot, backend) = sim_robot();

        let mut controller = ControllerState {
            left_y: 1.0,
            right_y: -0.5,
            ..Default::default()
        };
        controller.set_pressed(Button::L1, true);
        controller.set_pressed(Button::R2, true);

        robot.driver_cycle(&controller).unwrap();

        assert_eq!(backend.handle(13).unwrap().commanded_velocity_rpm(), 200.0);
        assert_eq!(backend.handle(10).unwrap().commanded_velocity_rpm(), 100.0);
        assert_eq!(backend.handle(18).unwrap().commanded_velocity_rpm(), 200.0);
        assert_eq!(backend.handle(15).unwrap().commanded_velocity_rpm(), 200.0);

        robot.stop_all();
        for port in backend.ports() {
            assert_eq!(backend.handle(port).unwrap().commanded_velocity_rpm(), 0.0);
        }
    }
}
