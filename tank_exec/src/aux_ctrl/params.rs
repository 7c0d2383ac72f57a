//! Parameters structure for the auxiliary actuators

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::man_ctrl::Button;
use crate::motor::GroupParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for an intake or conveyor.
#[derive(Clone, Debug, Deserialize)]
pub struct Params {
    /// Button driving the actuator forward (in or up).
    pub fwd_button: Button,

    /// Button driving the actuator in reverse (out or down).
    pub rev_button: Button,

    pub group: GroupParams
}
