//! # Drive PID controller
//!
//! A discrete PID controller stepped once per control cycle. Error is in
//! encoder degrees and the cycle period is fixed, so the integral and
//! derivative are plain sums and differences with no time scaling.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use util::maths::sym_clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller for one side of the drive
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Magnitude of error below which the integral is held at zero.
    windup_threshold: f64,

    /// Magnitude limit of the output.
    output_limit: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {

    /// Create a new controller with the given gains, anti-windup threshold
    /// and output limit.
    pub fn new(
        k_p: f64, 
        k_i: f64, 
        k_d: f64, 
        windup_threshold: f64, 
        output_limit: f64
    ) -> Self {
        Self {
            k_p, k_i, k_d,
            windup_threshold,
            output_limit: output_limit.abs(),
            prev_error: None,
            integral: 0f64
        }
    }

    /// Get the output of the controller for the given error.
    pub fn get(&mut self, error: f64) -> f64 {
        self.integral += error;

        // Anti-windup, the integral only acts far from the target
        if error.abs() < self.windup_threshold {
            self.integral = 0f64;
        }

        // No derivative on the first cycle, there is nothing to difference
        // against.
        let deriv = match self.prev_error {
            Some(e) => error - e,
            None => 0f64
        };

        self.prev_error = Some(error);

        let out = 
            self.k_p * error 
            + self.k_i * self.integral 
            + self.k_d * deriv;

        sym_clamp(out, self.output_limit)
    }

    /// The current integral accumulation.
    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn output_limit(&self) -> f64 {
        self.output_limit
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_terms() {
        let mut pid = PidController::new(2.0, 0.5, 1.0, 10.0, 1e6);

        // First cycle: P + I, no D
        assert_eq!(pid.get(100.0), 2.0 * 100.0 + 0.5 * 100.0);
        assert_eq!(pid.integral(), 100.0);

        // Second cycle: D is the error difference
        assert_eq!(pid.get(80.0), 2.0 * 80.0 + 0.5 * 180.0 + 1.0 * -20.0);
        assert_eq!(pid.integral(), 180.0);
    }

    #[test]
    fn test_output_clamp() {
        let mut pid = PidController::new(60.0, 0.05, 55.0, 10.0, 12000.0);

        for e in &[1e9, -1e9, 430.0, -430.0, 3.0, 0.0] {
            let out = pid.get(*e);
            assert!(out.abs() <= 12000.0, "output {} for error {}", out, e);
        }

        let mut pid = PidController::new(60.0, 0.0, 0.0, 10.0, -200.0);
        assert_eq!(pid.output_limit(), 200.0);
        assert_eq!(pid.get(-1000.0), -200.0);
    }

    #[test]
    fn test_anti_windup() {
        let mut pid = PidController::new(60.0, 0.05, 55.0, 10.0, 12000.0);

        // Error oscillating across the threshold never lets the integral grow
        // beyond the single largest error
        for i in 0..1000 {
            let e = if i % 2 == 0 { 50.0 } else { 5.0 };
            pid.get(e);
            assert!(pid.integral() <= 50.0);
        }
        assert_eq!(pid.integral(), 0.0);

        // Away from the target it accumulates as normal
        pid.get(50.0);
        pid.get(50.0);
        assert_eq!(pid.integral(), 100.0);
    }
}
