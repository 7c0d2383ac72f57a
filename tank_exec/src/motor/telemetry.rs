//! Motor telemetry snapshots

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A point in time readout of a motor group.
///
/// Snapshots are never cached, request a new one for fresh data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Telemetry {
    /// Units: degrees
    pub pos_deg: f64,

    /// Units: degrees
    pub target_pos_deg: f64,

    /// Units: rpm
    pub velo_rpm: f64,

    /// Units: rpm
    pub target_velo_rpm: f64,

    /// Hottest motor in the group.
    ///
    /// Units: degrees celsius
    pub temp_c: f64,

    /// Units: newton meters
    pub torque_nm: f64
}
