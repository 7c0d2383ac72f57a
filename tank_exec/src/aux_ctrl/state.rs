//! Implementations of the auxiliary actuators

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;

// Internal
use super::{AuxDem, Params};
use crate::man_ctrl::{Button, ControllerState};
use crate::motor::{ConfigError, MotorBackend, MotorGroup, Telemetry};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A motor group driven open loop at full speed forward, full speed in
/// reverse, or not at all.
pub struct AuxCtrl {
    name: &'static str,

    group: MotorGroup,

    fwd_button: Button,
    rev_button: Button,

    dem: AuxDem
}

/// The intake rollers.
pub struct Intake(AuxCtrl);

/// The conveyor lifting balls from the intake.
pub struct Conveyor(AuxCtrl);

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AuxCtrl {
    pub fn new(
        name: &'static str,
        params: &Params, 
        backend: &mut dyn MotorBackend
    ) -> Result<Self, ConfigError> {
        let group = MotorGroup::from_params(&params.group, backend)?;

        debug!(
            "{} bound to {:?}/{:?}", 
            name, params.fwd_button, params.rev_button
        );

        Ok(Self {
            name,
            group,
            fwd_button: params.fwd_button,
            rev_button: params.rev_button,
            dem: AuxDem::Stop
        })
    }

    /// Largest command magnitude, the gearset's free speed.
    ///
    /// Units: rpm
    pub fn max_command_rpm(&self) -> f64 {
        self.group.max_velocity_rpm()
    }

    /// Drive the actuator with the given demand.
    pub fn apply(&mut self, dem: AuxDem) {
        if dem != self.dem {
            debug!("{} demand {:?} -> {:?}", self.name, self.dem, dem);
        }

        self.group.set_velocity(dem.sign() * self.max_command_rpm());
        self.dem = dem;
    }

    /// Poll the actuator's buttons and apply the resulting demand.
    pub fn driver(&mut self, controller: &ControllerState) {
        self.apply(AuxDem::from_buttons(
            controller.is_pressed(self.fwd_button),
            controller.is_pressed(self.rev_button)
        ));
    }

    /// The last applied demand.
    pub fn demand(&self) -> AuxDem {
        self.dem
    }

    pub fn telemetry(&self) -> Telemetry {
        self.group.telemetry()
    }
}

impl Intake {
    pub fn new(params: &Params, backend: &mut dyn MotorBackend) 
        -> Result<Self, ConfigError> 
    {
        AuxCtrl::new("Intake", params, backend).map(Intake)
    }

    pub fn pull_in(&mut self) {
        self.0.apply(AuxDem::Forward);
    }

    pub fn push_out(&mut self) {
        self.0.apply(AuxDem::Reverse);
    }

    pub fn stop(&mut self) {
        self.0.apply(AuxDem::Stop);
    }

    pub fn apply(&mut self, dem: AuxDem) {
        self.0.apply(dem);
    }

    pub fn driver(&mut self, controller: &ControllerState) {
        self.0.driver(controller);
    }

    pub fn demand(&self) -> AuxDem {
        self.0.demand()
    }

    pub fn telemetry(&self) -> Telemetry {
        self.0.telemetry()
    }
}

impl Conveyor {
    pub fn new(params: &Params, backend: &mut dyn MotorBackend) 
        -> Result<Self, ConfigError> 
    {
        AuxCtrl::new("Conveyor", params, backend).map(Conveyor)
    }

    pub fn move_up(&mut self) {
        self.0.apply(AuxDem::Forward);
    }

    pub fn move_down(&mut self) {
        self.0.apply(AuxDem::Reverse);
    }

    pub fn stop(&mut self) {
        self.0.apply(AuxDem::Stop);
    }

    pub fn apply(&mut self, dem: AuxDem) {
        self.0.apply(dem);
    }

    pub fn driver(&mut self, controller: &ControllerState) {
        self.0.driver(controller);
    }

    pub fn demand(&self) -> AuxDem {
        self.0.demand()
    }

    pub fn telemetry(&self) -> Telemetry {
        self.0.telemetry()
    }
}
