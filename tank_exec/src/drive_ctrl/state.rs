//! Implementations for the DriveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use std::f64::consts::PI;
use std::thread;
use std::time::Duration;

// Internal
use super::{
    DriveCtrlError, MotionOutcome, MotionReport, OutputMode, Params,
    PidController
};
use crate::abort::AbortHandle;
use crate::motor::{MotorBackend, MotorGroup, Telemetry};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control module state
pub struct DriveCtrl {
    params: Params,

    left: MotorGroup,
    right: MotorGroup,

    abort: AbortHandle
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveCtrl {
    
    /// Build the drive from its parameters, opening the motors of both
    /// sides on the given backend.
    pub fn new(
        params: Params, 
        backend: &mut dyn MotorBackend
    ) -> Result<Self, DriveCtrlError> {
        params.are_valid()?;

        let left = MotorGroup::from_params(&params.left, backend)?;
        let right = MotorGroup::from_params(&params.right, backend)?;

        info!(
            "DriveCtrl initialised: wheel {} in, base {} in, gains ({}, {}, {}), \
            {:?} output",
            params.wheel_diameter_in,
            params.base_width_in,
            params.k_p, params.k_i, params.k_d,
            params.output_mode
        );

        Ok(Self {
            params,
            left,
            right,
            abort: AbortHandle::new()
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// A handle which stops any running motion when raised.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Operator control, each joystick axis in [-1, 1] drives its own side.
    pub fn driver(&mut self, left_axis: f64, right_axis: f64) {
        self.left.set_digital_mapped(left_axis);
        self.right.set_digital_mapped(right_axis);
    }

    /// Units: rpm
    pub fn set_velocity(&mut self, left_rpm: f64, right_rpm: f64) {
        self.left.set_velocity(left_rpm);
        self.right.set_velocity(right_rpm);
    }

    /// Units: millivolts
    pub fn set_voltage(&mut self, left_mv: f64, right_mv: f64) {
        self.left.set_voltage(left_mv);
        self.right.set_voltage(right_mv);
    }

    /// Command both sides to zero velocity.
    pub fn stop(&mut self) {
        self.set_velocity(0.0, 0.0);
    }

    /// Drive forward (positive) or backward (negative) by the given distance.
    ///
    /// Blocks until the motion ends, see `drive_pid`.
    ///
    /// Units: inches
    pub fn move_straight(
        &mut self, 
        distance_in: f64, 
        max_output: Option<f64>
    ) -> MotionReport {
        info!("Move straight {:.2} in", distance_in);

        let (left_deg, right_deg) = 
            straight_targets(distance_in, self.params.wheel_diameter_in);

        self.drive_pid(left_deg, right_deg, max_output)
    }

    /// Turn on the spot by the given angle, clockwise (seen from above) is
    /// positive.
    ///
    /// Blocks until the motion ends, see `drive_pid`.
    ///
    /// Units: degrees
    pub fn turn_angle(
        &mut self, 
        angle_deg: f64, 
        max_output: Option<f64>
    ) -> MotionReport {
        info!("Turn {:.2} deg", angle_deg);

        let (left_deg, right_deg) = turn_targets(
            angle_deg, 
            self.params.wheel_diameter_in, 
            self.params.base_width_in
        );

        self.drive_pid(left_deg, right_deg, max_output)
    }

    /// Drive each side by the given number of encoder degrees from where it
    /// currently is.
    ///
    /// Both sides are tared, then stepped together once per control period
    /// until both errors are within the settle threshold. A side that settles
    /// first keeps receiving corrections until its partner catches up. The
    /// loop also ends if the abort handle is raised or the iteration cap is
    /// reached. Both sides are commanded to zero velocity on exit.
    ///
    /// `max_output` further limits the output magnitude below the output
    /// mode's own limit. It must be positive, otherwise nothing is driven and
    /// the motion ends as `InvalidLimit`.
    pub fn drive_pid(
        &mut self, 
        left_target_deg: f64, 
        right_target_deg: f64,
        max_output: Option<f64>
    ) -> MotionReport {
        let limit = match self.output_limit(max_output) {
            Some(l) => l,
            None => {
                warn!("Rejected motion with output limit {:?}", max_output);
                self.stop();
                return MotionReport {
                    outcome: MotionOutcome::InvalidLimit,
                    iterations: 0,
                    left_target_deg,
                    right_target_deg,
                    left_error_deg: left_target_deg,
                    right_error_deg: right_target_deg
                };
            }
        };
        let threshold = self.params.settle_threshold_deg;
        let period = Duration::from_millis(self.params.ctrl_period_ms);

        self.left.tare_position();
        self.right.tare_position();
        self.left.set_target_position(left_target_deg);
        self.right.set_target_position(right_target_deg);

        let mut left_pid = self.new_pid(limit);
        let mut right_pid = self.new_pid(limit);

        debug!(
            "DriveCtrl targets: left {:.2} deg, right {:.2} deg, limit {}",
            left_target_deg, right_target_deg, limit
        );

        let mut iterations = 0u64;
        let mut left_error = left_target_deg - self.left.position_deg();
        let mut right_error = right_target_deg - self.right.position_deg();

        let outcome = loop {
            if left_error.abs() <= threshold && right_error.abs() <= threshold {
                break MotionOutcome::Settled;
            }

            if self.abort.is_aborted() {
                break MotionOutcome::Aborted;
            }

            if let Some(max) = self.params.max_iterations {
                if iterations >= max {
                    break MotionOutcome::IterationLimit;
                }
            }

            let left_out = left_pid.get(left_error);
            let right_out = right_pid.get(right_error);
            self.apply_output(left_out, right_out);

            iterations += 1;

            trace!(
                "DriveCtrl cycle {}: err ({:.2}, {:.2}) out ({:.1}, {:.1})",
                iterations, left_error, right_error, left_out, right_out
            );

            thread::sleep(period);

            left_error = left_target_deg - self.left.position_deg();
            right_error = right_target_deg - self.right.position_deg();
        };

        self.stop();

        let report = MotionReport {
            outcome,
            iterations,
            left_target_deg,
            right_target_deg,
            left_error_deg: left_error,
            right_error_deg: right_error
        };

        match outcome {
            MotionOutcome::Settled => info!(
                "Motion settled after {} cycles (err {:.2}, {:.2} deg)",
                iterations, left_error, right_error
            ),
            _ => warn!(
                "Motion ended without settling ({:?}) after {} cycles \
                (err {:.2}, {:.2} deg)",
                outcome, iterations, left_error, right_error
            )
        }

        report
    }

    /// Convert a wheel travel distance into encoder degrees.
    pub fn inches_to_degrees(&self, inches: f64) -> f64 {
        inches_to_degrees(inches, self.params.wheel_diameter_in)
    }

    /// Fresh telemetry for the left side.
    pub fn left_telemetry(&self) -> Telemetry {
        self.left.telemetry()
    }

    /// Fresh telemetry for the right side.
    pub fn right_telemetry(&self) -> Telemetry {
        self.right.telemetry()
    }

    /// Output magnitude limit for a motion, or `None` if `max_output` is not
    /// a positive number.
    fn output_limit(&self, max_output: Option<f64>) -> Option<f64> {
        let max_rpm = self.left
            .max_velocity_rpm()
            .min(self.right.max_velocity_rpm());
        let mode_limit = self.params.output_mode.limit(max_rpm);

        match max_output {
            Some(m) if m > 0.0 => Some(m.min(mode_limit)),
            Some(_) => None,
            None => Some(mode_limit)
        }
    }

    fn new_pid(&self, limit: f64) -> PidController {
        PidController::new(
            self.params.k_p,
            self.params.k_i,
            self.params.k_d,
            self.params.windup_threshold_deg,
            limit
        )
    }

    fn apply_output(&mut self, left_out: f64, right_out: f64) {
        match self.params.output_mode {
            OutputMode::Voltage => self.set_voltage(left_out, right_out),
            OutputMode::Velocity => self.set_velocity(left_out, right_out)
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Encoder degrees turned by a wheel of the given diameter to travel a
/// distance.
///
/// One revolution (360 degrees) covers one circumference.
pub fn inches_to_degrees(inches: f64, wheel_diameter_in: f64) -> f64 {
    inches * 360.0 / (wheel_diameter_in * PI)
}

/// Left and right encoder targets for a straight move.
///
/// Units: inches in, degrees out
pub fn straight_targets(distance_in: f64, wheel_diameter_in: f64) -> (f64, f64) {
    let deg = inches_to_degrees(distance_in, wheel_diameter_in);
    (deg, deg)
}

/// Left and right encoder targets for a turn on the spot.
///
/// Each side travels the arc of radius half the base width. A positive
/// (clockwise) angle drives the left side forward and the right side back.
///
/// Units: degrees and inches in, degrees out
pub fn turn_targets(
    angle_deg: f64, 
    wheel_diameter_in: f64, 
    base_width_in: f64
) -> (f64, f64) {
    let turn_length_in = angle_deg * (PI / 180.0) * (base_width_in / 2.0);
    let deg = inches_to_degrees(turn_length_in, wheel_diameter_in);
    (deg, -deg)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::motor::{Gearset, GroupParams};
    use crate::sim::{SimBackend, SimMode, SimParams};

    const TOL: f64 = 1e-9;

    fn params() -> Params {
        Params {
            left: GroupParams {
                ports: vec![1, 2],
                reversed: vec![false, false],
                gearset: Gearset::Green
            },
            right: GroupParams {
                ports: vec![3, 4],
                reversed: vec![true, true],
                gearset: Gearset::Green
            },
            wheel_diameter_in: 4.0,
            base_width_in: 12.75,
            k_p: 60.0,
            k_i: 0.05,
            k_d: 55.0,
            settle_threshold_deg: 5.0,
            windup_threshold_deg: 10.0,
            output_mode: OutputMode::Voltage,
            ctrl_period_ms: 0,
            max_iterations: Some(2000)
        }
    }

    fn build(params: Params) -> (DriveCtrl, SimBackend) {
        let mut backend = SimBackend::new(SimParams {
            step_s: 0.02,
            time_const_s: 0.0,
            ..Default::default()
        });
        let drive = DriveCtrl::new(params, &mut backend).unwrap();
        (drive, backend)
    }

    #[test]
    fn test_straight_targets() {
        for d in &[-48.0, -7.5, 0.0, 1.0, 15.0, 23.0, 100.0] {
            let (l, r) = straight_targets(*d, 4.0);
            assert_eq!(l, r);
            assert!((l - d * 360.0 / (4.0 * PI)).abs() < TOL);
            assert_eq!(l.signum(), if *d < 0.0 { -1.0 } else { 1.0 });
        }

        // 15 in on a 4 in wheel
        let (l, _) = straight_targets(15.0, 4.0);
        assert!((l - 429.718).abs() < 1e-3);
    }

    #[test]
    fn test_turn_targets() {
        for a in &[-128.0, -90.0, 45.0, 90.0, 95.0, 128.0] {
            let (l, r) = turn_targets(*a, 4.0, 12.75);
            assert!((l + r).abs() < TOL);
            assert_eq!(l.signum(), a.signum());

            let arc = a * PI / 180.0 * 6.375;
            assert!((l - inches_to_degrees(arc, 4.0)).abs() < TOL);
        }

        // 90 deg is a 10.01 in arc per side
        let (l, r) = turn_targets(90.0, 4.0, 12.75);
        assert!((l - 286.875).abs() < 1e-3);
        assert!((r + 286.875).abs() < 1e-3);
    }

    #[test]
    fn test_new_invalid() {
        let mut p = params();
        p.wheel_diameter_in = 0.0;
        let mut b = SimBackend::new(SimParams::default());
        assert!(matches!(
            DriveCtrl::new(p, &mut b),
            Err(DriveCtrlError::InvalidParams(_))
        ));

        let mut p = params();
        p.right.ports = vec![1, 5];
        p.right.reversed = vec![true, true];
        let mut b = SimBackend::new(SimParams::default());
        assert!(matches!(
            DriveCtrl::new(p, &mut b),
            Err(DriveCtrlError::Config(_))
        ));
    }

    #[test]
    fn test_move_zero() {
        let (mut drive, backend) = build(params());

        let report = drive.move_straight(0.0, None);

        assert_eq!(report.outcome, MotionOutcome::Settled);
        assert_eq!(report.iterations, 0);
        assert_eq!(report.left_target_deg, 0.0);
        assert_eq!(report.right_target_deg, 0.0);

        for port in backend.ports() {
            assert_eq!(backend.handle(port).unwrap().mode(), SimMode::Velocity(0.0));
        }
    }

    #[test]
    fn test_move_straight() {
        let (mut drive, backend) = build(params());

        let report = drive.move_straight(15.0, None);

        assert!(report.settled());
        assert!(report.iterations > 0);
        assert!((report.left_target_deg - 429.718).abs() < 1e-3);
        assert!(report.left_error_deg.abs() <= 5.0);
        assert!(report.right_error_deg.abs() <= 5.0);

        // Left motors are forward, right motors are reversed so their raw
        // encoders count the other way
        assert!(backend.handle(1).unwrap().position_deg() > 420.0);
        assert!(backend.handle(3).unwrap().position_deg() < -420.0);

        let tm = drive.left_telemetry();
        assert!((tm.target_pos_deg - 429.718).abs() < 1e-3);
        assert!((tm.pos_deg - 429.718).abs() <= 10.0);
        assert_eq!(tm.target_velo_rpm, 0.0);
    }

    #[test]
    fn test_turn_angle() {
        let (mut drive, _backend) = build(params());

        let report = drive.turn_angle(90.0, None);

        assert!(report.settled());
        assert!((report.left_target_deg - 286.875).abs() < 1e-3);
        assert!((report.right_target_deg + 286.875).abs() < 1e-3);

        assert!(drive.left_telemetry().pos_deg > 280.0);
        assert!(drive.right_telemetry().pos_deg < -280.0);
    }

    #[test]
    fn test_both_sides_must_settle() {
        let (mut drive, _backend) = build(params());

        // Left has nothing to do but the loop keeps running until the right
        // side arrives, and the left is held on target meanwhile
        let report = drive.drive_pid(0.0, 300.0, None);

        assert!(report.settled());
        assert!(report.iterations > 1);
        assert!(report.left_error_deg.abs() <= 5.0);
        assert!(report.right_error_deg.abs() <= 5.0);
    }

    #[test]
    fn test_velocity_mode() {
        let mut p = params();
        p.output_mode = OutputMode::Velocity;
        p.k_p = 1.0;
        p.k_i = 0.0;
        p.k_d = 0.0;
        let (mut drive, _backend) = build(p);

        let report = drive.move_straight(-10.0, Some(50.0));

        assert!(report.settled());
        assert!(report.left_target_deg < 0.0);
        assert!(drive.left_telemetry().pos_deg < -130.0);
    }

    #[test]
    fn test_stalled_motor_hits_limit() {
        let mut p = params();
        p.max_iterations = Some(50);
        let (mut drive, backend) = build(p);

        backend.handle(3).unwrap().set_stalled(true);
        backend.handle(4).unwrap().set_stalled(true);

        let report = drive.move_straight(15.0, None);

        assert_eq!(report.outcome, MotionOutcome::IterationLimit);
        assert_eq!(report.iterations, 50);
        assert!((report.right_error_deg - report.right_target_deg).abs() < TOL);

        // Motors are stopped once the loop gives up
        assert_eq!(backend.handle(1).unwrap().mode(), SimMode::Velocity(0.0));
    }

    #[test]
    fn test_abort() {
        let (mut drive, _backend) = build(params());

        let abort = drive.abort_handle();
        abort.abort();

        let report = drive.move_straight(15.0, None);
        assert_eq!(report.outcome, MotionOutcome::Aborted);
        assert_eq!(report.iterations, 0);

        abort.reset();
        assert!(drive.move_straight(5.0, None).settled());
    }

    #[test]
    fn test_non_positive_limit() {
        let (mut drive, backend) = build(params());

        for limit in &[0.0, -100.0, std::f64::NAN] {
            let report = drive.move_straight(15.0, Some(*limit));

            assert_eq!(report.outcome, MotionOutcome::InvalidLimit);
            assert_eq!(report.iterations, 0);
            assert_eq!(report.left_error_deg, report.left_target_deg);
            assert_eq!(backend.handle(1).unwrap().position_deg(), 0.0);
        }

        // A small positive limit still drives
        let report = drive.move_straight(5.0, Some(3000.0));
        assert!(report.settled());
    }

    #[test]
    fn test_driver() {
        let (mut drive, backend) = build(params());

        drive.driver(0.5, -1.0);

        assert_eq!(backend.handle(1).unwrap().commanded_velocity_rpm(), 100.0);
        assert_eq!(backend.handle(2).unwrap().commanded_velocity_rpm(), 100.0);
        // Right side is reversed
        assert_eq!(backend.handle(3).unwrap().commanded_velocity_rpm(), 200.0);

        // Manual control leaves nothing behind for the next motion
        let report = drive.move_straight(0.0, None);
        assert!(report.settled());
    }
}
