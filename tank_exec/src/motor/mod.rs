//! # Motor module
//!
//! Provides the seam between the motion controllers and the physical motor
//! drivers. A `MotorBackend` opens individual `Motor` handles on ports, and a
//! `MotorGroup` gangs one or more of them so they are always commanded as a
//! single unit.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod group;
mod telemetry;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use group::*;
pub use telemetry::*;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Largest voltage which can be commanded to a motor.
///
/// Units: millivolts
pub const MAX_VOLTAGE_MV: f64 = 12000.0;

/// Lowest valid smart port number.
pub const MIN_PORT: u8 = 1;

/// Highest valid smart port number.
pub const MAX_PORT: u8 = 21;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The internal gear cartridge of a motor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gearset {
    /// 36:1, torque cartridge
    Red,
    /// 18:1, standard cartridge
    Green,
    /// 6:1, speed cartridge
    Blue
}

/// Configuration errors detected while building a motor group.
///
/// These are always fatal, the robot must not run with a partially built
/// group.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("A motor group must contain at least one motor")]
    EmptyGroup,

    #[error(
        "Motor group has {num_ports} ports but {num_flags} reversal flags, \
        there must be exactly one flag per port"
    )]
    ReversalMismatch {
        num_ports: usize,
        num_flags: usize
    },

    #[error("Port {0} is outside the valid range 1-21")]
    PortOutOfRange(u8),

    #[error("Port {0} is already in use by another motor")]
    PortInUse(u8)
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A single physical motor.
///
/// All values are in the motor's own direction, reversal is applied by the
/// owning `MotorGroup`.
pub trait Motor: Send {
    /// The smart port the motor is plugged into.
    fn port(&self) -> u8;

    /// Open loop voltage command, bypassing the motor's velocity controller.
    ///
    /// Units: millivolts
    fn set_voltage(&mut self, voltage_mv: f64);

    /// Closed loop velocity command handled by the motor's own controller.
    ///
    /// Units: rpm
    fn set_velocity(&mut self, velocity_rpm: f64);

    /// Encoder position relative to the last tare.
    ///
    /// Units: degrees
    fn position_deg(&self) -> f64;

    /// Measured velocity.
    ///
    /// Units: rpm
    fn velocity_rpm(&self) -> f64;

    /// Velocity the motor's controller is driving toward, zero in voltage
    /// mode.
    ///
    /// Units: rpm
    fn target_velocity_rpm(&self) -> f64;

    /// Units: degrees celsius
    fn temperature_c(&self) -> f64;

    /// Units: newton meters
    fn torque_nm(&self) -> f64;

    /// Reset the encoder reference so the current shaft angle reads zero.
    fn tare_position(&mut self);
}

/// Something which can hand out motors, the hardware driver or a simulation.
pub trait MotorBackend {
    /// Open the motor on the given port.
    ///
    /// A backend shall never open the same port twice, returning
    /// `ConfigError::PortInUse` instead.
    fn open(&mut self, port: u8, gearset: Gearset)
        -> Result<Box<dyn Motor>, ConfigError>;

    /// Give up a port so it can be opened again.
    ///
    /// Any handle still held for the port must no longer be used.
    fn release(&mut self, port: u8);
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Gearset {
    /// Rated free speed of the cartridge.
    ///
    /// Units: rpm
    pub fn max_rpm(&self) -> f64 {
        match self {
            Gearset::Red => 100.0,
            Gearset::Green => 200.0,
            Gearset::Blue => 600.0
        }
    }
}

impl Default for Gearset {
    fn default() -> Self {
        Gearset::Green
    }
}

/// Check a port number is one the brain actually has.
pub fn check_port(port: u8) -> Result<(), ConfigError> {
    if (MIN_PORT..=MAX_PORT).contains(&port) {
        Ok(())
    }
    else {
        Err(ConfigError::PortOutOfRange(port))
    }
}
