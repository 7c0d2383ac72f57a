//! # Tank library.
//!
//! This library allows the executable and benchmarks to access the robot's
//! control modules.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Cooperative cancellation of blocking motions and waits
pub mod abort;

/// Autonomous manager - selects and runs the scripted autonomous routines
pub mod auto_mgr;

/// Auxiliary actuator control - open loop intake and conveyor
pub mod aux_ctrl;

/// Drive control - PID positional control of the differential drive
pub mod drive_ctrl;

/// Manual control - maps the operator's controller to drive demands
pub mod man_ctrl;

/// Motor abstraction - hardware seam, motor groups and telemetry
pub mod motor;

/// Executable parameters
pub mod params;

/// Robot - owns every actuator controller
pub mod robot;

/// Simulated motor backend
pub mod sim;

/// Telemetry archiving
pub mod tm_arch;
