//! # Autonomous routine runner

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    thread,
    time::{Duration, Instant},
};

use log::{debug, info, warn};
use serde::Serialize;

use super::{routine, AutoStep, AutonId};
use crate::{abort::AbortHandle, drive_ctrl::MotionReport, robot::Robot};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Longest uninterrupted sleep within a wait step, bounding how late an abort is noticed.
const WAIT_POLL_PERIOD: Duration = Duration::from_millis(10);

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Autonomy manager
pub struct AutoMgr {
    abort: AbortHandle,
}

/// Summary of an autonomous run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct AutoReport {
    pub auton: AutonId,

    /// Number of steps in the routine.
    pub num_steps: usize,

    /// Number of steps started before the run ended.
    pub steps_run: usize,

    /// Reports from every drive motion, in order.
    pub motions: Vec<MotionReport>,

    /// True if the run was aborted before completing.
    pub aborted: bool,

    /// Units: seconds
    pub duration_s: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl AutoMgr {
    /// Create a manager watching the given abort handle, usually the robot's own.
    pub fn new(abort: AbortHandle) -> Self {
        Self { abort }
    }

    /// Run the selected routine to completion or until aborted.
    pub fn run(&self, robot: &mut Robot, id: AutonId) -> AutoReport {
        info!("Starting autonomous routine \"{}\"", id);

        let mut report = self.run_steps(robot, &routine(id));
        report.auton = id;

        report
    }

    /// Run a list of steps in order.
    ///
    /// The intake and conveyor are stopped when the run ends, whether it completed or not.
    pub fn run_steps(&self, robot: &mut Robot, steps: &[AutoStep]) -> AutoReport {
        let start = Instant::now();

        let mut report = AutoReport {
            num_steps: steps.len(),
            ..Default::default()
        };

        for (i, step) in steps.iter().enumerate() {
            if self.abort.is_aborted() {
                report.aborted = true;
                break;
            }

            debug!("Step {}/{}: {:?}", i + 1, steps.len(), step);
            report.steps_run += 1;

            match *step {
                AutoStep::MoveStraight { distance_in } => {
                    report.motions.push(robot.drive.move_straight(distance_in, None))
                }
                AutoStep::TurnAngle { angle_deg } => {
                    report.motions.push(robot.drive.turn_angle(angle_deg, None))
                }
                AutoStep::Intake(dem) => robot.intake.apply(dem),
                AutoStep::Conveyor(dem) => robot.conveyor.apply(dem),
                AutoStep::Wait { ms } => self.wait(Duration::from_millis(ms)),
            }
        }

        // An abort raised during the final step still counts
        if self.abort.is_aborted() {
            report.aborted = true;
        }

        robot.intake.stop();
        robot.conveyor.stop();

        report.duration_s = start.elapsed().as_secs_f64();

        let unsettled = report.motions.iter().filter(|m| !m.settled()).count();

        if report.aborted {
            warn!(
                "Autonomous aborted after {} of {} steps ({:.2} s)",
                report.steps_run, report.num_steps, report.duration_s
            );
        } else if unsettled > 0 {
            warn!(
                "Autonomous complete in {:.2} s, {} motions did not settle",
                report.duration_s, unsettled
            );
        } else {
            info!("Autonomous complete in {:.2} s", report.duration_s);
        }

        report
    }

    /// Sleep for the given duration, returning early if aborted.
    fn wait(&self, duration: Duration) {
        let end = Instant::now() + duration;

        loop {
            if self.abort.is_aborted() {
                return;
            }

            let now = Instant::now();
            if now >= end {
                return;
            }

            thread::sleep((end - now).min(WAIT_POLL_PERIOD));
        }
    }
}
