//! # Simulated motor backend
//!
//! Stands in for the motor hardware on host builds. Each simulated motor is a
//! first order plant: a command sets the velocity the motor is heading
//! toward, and every command write advances the simulation by one fixed
//! step. Because the controllers write each motor exactly once per control
//! cycle, one cycle is one simulation step, which keeps runs deterministic.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

// Internal
use crate::motor::{
    check_port, ConfigError, Gearset, Motor, MotorBackend, MAX_VOLTAGE_MV
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Degrees per second for each rpm.
const DEG_S_PER_RPM: f64 = 6.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the simulated motors.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Simulated time advanced by each command write.
    ///
    /// Units: seconds
    pub step_s: f64,

    /// Time constant of the velocity response, zero for an instant response.
    ///
    /// Units: seconds
    pub time_const_s: f64,

    /// Units: degrees celsius
    pub ambient_temp_c: f64,

    /// Temperature rise per second at full effort.
    ///
    /// Units: degrees celsius/second
    pub heat_rate_cs: f64,

    /// Torque produced at full effort by a green cartridge, other cartridges
    /// scale with their ratio.
    ///
    /// Units: newton meters
    pub stall_torque_nm: f64
}

/// A simulated backend handing out `SimMotor`s.
pub struct SimBackend {
    params: SimParams,
    motors: BTreeMap<u8, SimMotorHandle>
}

/// A simulated motor, as used by a `MotorGroup`.
pub struct SimMotor {
    state: Arc<Mutex<SimState>>
}

/// Shared access to a simulated motor for inspection and fault injection.
#[derive(Clone)]
pub struct SimMotorHandle {
    state: Arc<Mutex<SimState>>
}

/// The command last written to a simulated motor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimMode {
    /// Units: millivolts
    Voltage(f64),
    /// Units: rpm
    Velocity(f64)
}

struct SimState {
    port: u8,
    gearset: Gearset,
    params: SimParams,

    mode: SimMode,
    stalled: bool,

    /// Raw position since the last tare.
    position_deg: f64,
    velocity_rpm: f64,
    temp_c: f64,
    torque_nm: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            step_s: 0.02,
            time_const_s: 0.05,
            ambient_temp_c: 25.0,
            heat_rate_cs: 0.5,
            stall_torque_nm: 2.1
        }
    }
}

impl SimBackend {
    pub fn new(params: SimParams) -> Self {
        Self {
            params,
            motors: BTreeMap::new()
        }
    }

    /// Get a handle to the motor opened on `port`, if there is one.
    pub fn handle(&self, port: u8) -> Option<SimMotorHandle> {
        self.motors.get(&port).cloned()
    }

    /// Ports of every opened motor, in ascending order.
    pub fn ports(&self) -> Vec<u8> {
        self.motors.keys().copied().collect()
    }
}

impl MotorBackend for SimBackend {
    fn open(&mut self, port: u8, gearset: Gearset)
        -> Result<Box<dyn Motor>, ConfigError>
    {
        check_port(port)?;

        if self.motors.contains_key(&port) {
            return Err(ConfigError::PortInUse(port));
        }

        let state = Arc::new(Mutex::new(SimState {
            port,
            gearset,
            params: self.params.clone(),
            mode: SimMode::Velocity(0.0),
            stalled: false,
            position_deg: 0.0,
            velocity_rpm: 0.0,
            temp_c: self.params.ambient_temp_c,
            torque_nm: 0.0
        }));

        self.motors.insert(port, SimMotorHandle { state: state.clone() });

        debug!("Simulated {:?} motor opened on port {}", gearset, port);

        Ok(Box::new(SimMotor { state }))
    }

    fn release(&mut self, port: u8) {
        if self.motors.remove(&port).is_some() {
            debug!("Simulated motor on port {} released", port);
        }
    }
}

impl SimState {
    /// Apply a new command and advance the plant by one step.
    fn command(&mut self, mode: SimMode) {
        self.mode = mode;

        let max_rpm = self.gearset.max_rpm();
        let (target_rpm, effort) = match mode {
            SimMode::Voltage(mv) => {
                let norm = (mv / MAX_VOLTAGE_MV).max(-1.0).min(1.0);
                (norm * max_rpm, norm.abs())
            },
            SimMode::Velocity(rpm) => {
                let rpm = rpm.max(-max_rpm).min(max_rpm);
                (rpm, (rpm / max_rpm).abs())
            }
        };

        let step_s = self.params.step_s;

        self.torque_nm = self.params.stall_torque_nm 
            * effort 
            * Gearset::Green.max_rpm() / max_rpm;
        self.temp_c += self.params.heat_rate_cs * effort * step_s;

        if self.stalled {
            self.velocity_rpm = 0.0;
            return;
        }

        let alpha = if self.params.time_const_s <= 0.0 {
            1.0
        }
        else {
            (step_s / self.params.time_const_s).min(1.0)
        };

        self.velocity_rpm += (target_rpm - self.velocity_rpm) * alpha;
        self.position_deg += self.velocity_rpm * DEG_S_PER_RPM * step_s;
    }
}

impl SimMotor {
    fn lock(&self) -> MutexGuard<'_, SimState> {
        lock_state(&self.state)
    }
}

impl Motor for SimMotor {
    fn port(&self) -> u8 {
        self.lock().port
    }

    fn set_voltage(&mut self, voltage_mv: f64) {
        self.lock().command(SimMode::Voltage(voltage_mv));
    }

    fn set_velocity(&mut self, velocity_rpm: f64) {
        self.lock().command(SimMode::Velocity(velocity_rpm));
    }

    fn position_deg(&self) -> f64 {
        self.lock().position_deg
    }

    fn velocity_rpm(&self) -> f64 {
        self.lock().velocity_rpm
    }

    fn target_velocity_rpm(&self) -> f64 {
        match self.lock().mode {
            SimMode::Velocity(rpm) => rpm,
            SimMode::Voltage(_) => 0.0
        }
    }

    fn temperature_c(&self) -> f64 {
        self.lock().temp_c
    }

    fn torque_nm(&self) -> f64 {
        self.lock().torque_nm
    }

    fn tare_position(&mut self) {
        self.lock().position_deg = 0.0;
    }
}

impl SimMotorHandle {
    fn lock(&self) -> MutexGuard<'_, SimState> {
        lock_state(&self.state)
    }

    /// The last command written to the motor.
    pub fn mode(&self) -> SimMode {
        self.lock().mode
    }

    /// Velocity command in velocity mode, zero in voltage mode.
    ///
    /// Units: rpm
    pub fn commanded_velocity_rpm(&self) -> f64 {
        match self.lock().mode {
            SimMode::Velocity(rpm) => rpm,
            SimMode::Voltage(_) => 0.0
        }
    }

    /// Voltage command, or `None` in velocity mode.
    ///
    /// Units: millivolts
    pub fn commanded_voltage_mv(&self) -> Option<f64> {
        match self.lock().mode {
            SimMode::Voltage(mv) => Some(mv),
            SimMode::Velocity(_) => None
        }
    }

    /// Raw position since the last tare.
    ///
    /// Units: degrees
    pub fn position_deg(&self) -> f64 {
        self.lock().position_deg
    }

    /// Freeze the motor, modelling a jammed mechanism or dead encoder.
    pub fn set_stalled(&self, stalled: bool) {
        if stalled {
            warn!("Simulated motor on port {} stalled", self.lock().port);
        }
        self.lock().stalled = stalled;
    }

    pub fn set_temperature_c(&self, temp_c: f64) {
        self.lock().temp_c = temp_c;
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Lock a motor's state. A poisoned lock only means a panic happened while
/// another handle held it, the plant state itself is still usable.
fn lock_state(state: &Arc<Mutex<SimState>>) -> MutexGuard<'_, SimState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}
