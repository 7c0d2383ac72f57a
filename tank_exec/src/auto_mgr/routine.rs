//! # Autonomous routines

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;

use super::AutonId;
use crate::aux_ctrl::AuxDem;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A single step of an autonomous routine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum AutoStep {
    /// Units: inches, forward is positive
    MoveStraight { distance_in: f64 },

    /// Units: degrees, clockwise is positive
    TurnAngle { angle_deg: f64 },

    Intake(AuxDem),

    Conveyor(AuxDem),

    /// Units: milliseconds
    Wait { ms: u64 },
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// The steps making up the given routine.
///
/// Every routine, `None` included, starts by backing clear of the wall and running the conveyor to
/// score the preload.
pub fn routine(id: AutonId) -> Vec<AutoStep> {
    use AuxDem::*;
    use AutoStep::*;

    let mut steps = vec![
        MoveStraight { distance_in: 3.0 },
        Conveyor(Forward),
        Wait { ms: 500 },
        Conveyor(Stop),
        Wait { ms: 50 },
    ];

    match id {
        AutonId::None | AutonId::Test => (),
        AutonId::Left => steps.extend_from_slice(&corner(-128.0, &[
            Wait { ms: 2000 },
            Intake(Stop),
            Wait { ms: 1000 },
            Conveyor(Stop),
        ])),
        AutonId::Right => steps.extend_from_slice(&corner(128.0, &[
            Wait { ms: 4000 },
            Conveyor(Stop),
        ])),
        AutonId::MidLeft => steps.extend_from_slice(&[
            MoveStraight { distance_in: 12.0 },
            TurnAngle { angle_deg: 90.0 },
            MoveStraight { distance_in: 16.75 },
            TurnAngle { angle_deg: 95.0 },
            MoveStraight { distance_in: 15.25 },
            Conveyor(Forward),
            Wait { ms: 3000 },
            Conveyor(Stop),
            Intake(Reverse),
            MoveStraight { distance_in: -8.0 },
            Intake(Stop),
            TurnAngle { angle_deg: 90.0 },
            Intake(Forward),
            MoveStraight { distance_in: 40.0 },
            Intake(Stop),
        ]),
    }

    steps
}

/// The corner goal routines, mirrored by the sign of the turn towards the goal.
///
/// `settle` runs once the robot has driven into the goal, before backing off.
fn corner(turn_deg: f64, settle: &[AutoStep]) -> Vec<AutoStep> {
    use AuxDem::*;
    use AutoStep::*;

    let mut steps = vec![
        MoveStraight { distance_in: 15.0 },
        TurnAngle { angle_deg: turn_deg },
        Intake(Forward),
        Conveyor(Forward),
        MoveStraight { distance_in: 23.0 },
        Wait { ms: 1500 },
        MoveStraight { distance_in: 7.5 },
    ];

    steps.extend_from_slice(settle);
    steps.extend_from_slice(&[
        MoveStraight { distance_in: -8.0 },
        Intake(Reverse),
        Wait { ms: 2000 },
        Intake(Stop),
    ]);

    steps
}

/// Total time spent in `Wait` steps.
pub fn total_wait_ms(steps: &[AutoStep]) -> u64 {
    steps
        .iter()
        .map(|s| match s {
            AutoStep::Wait { ms } => *ms,
            _ => 0,
        })
        .sum()
}

#[cfg(test)]
mod test {
    use super::*;
    use AuxDem::*;
    use AutoStep::*;

    #[test]
    fn test_preamble() {
        for id in AutonId::ALL.iter() {
            let steps = routine(*id);
            assert_eq!(steps[0], MoveStraight { distance_in: 3.0 });
            assert_eq!(steps[1], Conveyor(Forward));
            assert_eq!(steps[4], Wait { ms: 50 });
        }

        assert_eq!(routine(AutonId::None).len(), 5);
        assert_eq!(routine(AutonId::Test), routine(AutonId::None));
    }

    #[test]
    fn test_corners() {
        let left = routine(AutonId::Left);
        let right = routine(AutonId::Right);

        assert_eq!(left[6], TurnAngle { angle_deg: -128.0 });
        assert_eq!(right[6], TurnAngle { angle_deg: 128.0 });

        assert_eq!(left.len(), 20);
        assert_eq!(right.len(), 18);
        assert_eq!(total_wait_ms(&left), 550 + 1500 + 2000 + 1000 + 2000);
        assert_eq!(total_wait_ms(&right), 550 + 1500 + 4000 + 2000);

        // Both finish backing off and spitting out
        for steps in &[&left, &right] {
            let n = steps.len();
            assert_eq!(steps[n - 4], MoveStraight { distance_in: -8.0 });
            assert_eq!(steps[n - 1], Intake(Stop));
        }
    }

    #[test]
    fn test_mid_left() {
        let steps = routine(AutonId::MidLeft);

        let turns: Vec<f64> = steps
            .iter()
            .filter_map(|s| match s {
                TurnAngle { angle_deg } => Some(*angle_deg),
                _ => None,
            })
            .collect();
        assert_eq!(turns, vec![90.0, 95.0, 90.0]);

        assert_eq!(steps.last(), Some(&Intake(Stop)));
        assert_eq!(total_wait_ms(&steps), 550 + 3000);
    }
}
