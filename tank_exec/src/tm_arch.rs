//! Telemetry archiving
//!
//! Writes one CSV row per actuator per operator control cycle into the
//! session's archive directory.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::motor::Telemetry;
use crate::robot::Robot;
use util::{
    archive::{ArchiveError, Archiver},
    session::{self, Session}
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Archivers for every actuator on the robot.
pub struct TmArchive {
    drive_left: Archiver,
    drive_right: Archiver,
    intake: Archiver,
    conveyor: Archiver
}

/// A single telemetry record.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TmRow {
    /// Units: seconds since the session epoch
    pub time_s: f64,

    pub pos_deg: f64,
    pub target_pos_deg: f64,
    pub velo_rpm: f64,
    pub target_velo_rpm: f64,
    pub temp_c: f64,
    pub torque_nm: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TmArchive {
    pub fn new(session: &Session) -> Result<Self, ArchiveError> {
        Ok(Self {
            drive_left: Archiver::from_path(session, "drive/left.csv")?,
            drive_right: Archiver::from_path(session, "drive/right.csv")?,
            intake: Archiver::from_path(session, "intake.csv")?,
            conveyor: Archiver::from_path(session, "conveyor.csv")?
        })
    }

    /// Read fresh telemetry from the robot and archive it.
    pub fn write(&mut self, robot: &Robot) -> Result<(), ArchiveError> {
        let time_s = session::get_elapsed_seconds();

        self.drive_left.serialise(
            TmRow::new(time_s, robot.drive.left_telemetry())
        )?;
        self.drive_right.serialise(
            TmRow::new(time_s, robot.drive.right_telemetry())
        )?;
        self.intake.serialise(TmRow::new(time_s, robot.intake.telemetry()))?;
        self.conveyor.serialise(
            TmRow::new(time_s, robot.conveyor.telemetry())
        )
    }
}

impl TmRow {
    pub fn new(time_s: f64, tm: Telemetry) -> Self {
        Self {
            time_s,
            pos_deg: tm.pos_deg,
            target_pos_deg: tm.target_pos_deg,
            velo_rpm: tm.velo_rpm,
            target_velo_rpm: tm.target_velo_rpm,
            temp_c: tm.temp_c,
            torque_nm: tm.torque_nm
        }
    }
}
