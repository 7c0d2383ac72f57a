//! Operator controller state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Digital buttons on the operator's controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Button {
    L1, L2, R1, R2,
    Up, Down, Left, Right,
    X, B, Y, A
}

/// A snapshot of the operator's controller.
///
/// Analogue axes are normalised to [-1, 1], positive is up or right.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControllerState {
    pub left_x: f64,
    pub left_y: f64,
    pub right_x: f64,
    pub right_y: f64,

    /// Buttons held down.
    pub buttons: HashSet<Button>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ControllerState {
    pub fn is_pressed(&self, button: Button) -> bool {
        self.buttons.contains(&button)
    }

    /// Set the state of a button.
    pub fn set_pressed(&mut self, button: Button, pressed: bool) {
        if pressed {
            self.buttons.insert(button);
        }
        else {
            self.buttons.remove(&button);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_deserialise() {
        let s: ControllerState = serde_json::from_str(
            r#"{"left_y": 0.5, "right_y": -1.0, "buttons": ["L1", "R2"]}"#
        ).unwrap();

        assert_eq!(s.left_x, 0.0);
        assert_eq!(s.left_y, 0.5);
        assert_eq!(s.right_y, -1.0);
        assert!(s.is_pressed(Button::L1));
        assert!(s.is_pressed(Button::R2));
        assert!(!s.is_pressed(Button::L2));

        let s: ControllerState = serde_json::from_str("{}").unwrap();
        assert_eq!(s, ControllerState::default());

        assert!(serde_json::from_str::<ControllerState>(
            r#"{"buttons": ["L3"]}"#
        ).is_err());
    }

    #[test]
    fn test_set_pressed() {
        let mut s = ControllerState::default();
        s.set_pressed(Button::Up, true);
        assert!(s.is_pressed(Button::Up));
        s.set_pressed(Button::Up, false);
        assert!(!s.is_pressed(Button::Up));
    }
}
