use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

/// Named discrete actions the placement controller reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Held to enter rotate/scale editing.
    Modify,
    /// Commit a copy. Hides the preview unless `Modify` is held.
    Place,
    /// Commit a copy and keep the preview for repeated placement.
    PlaceKeep,
    ResetRotation,
    ResetScale,
    /// Reset rotation and scale together.
    ResetTransform,
    /// Ask the UI to open the template selection menu.
    OpenSelection,
}

/// Named two-dimensional input axes, each roughly in [-1, 1].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AxisId {
    /// Vertical nudge on `y`.
    Nudge,
    /// `x` drives yaw, `y` drives pitch.
    Rotate,
    /// `y` drives uniform scale.
    Scale,
}

/// Source of per-tick input for the placement controller.
pub trait PlacementInput {
    /// Single-fire press this tick.
    fn action_pressed(&self, action: Action) -> bool;

    /// Button currently held down.
    fn action_held(&self, action: Action) -> bool;

    fn axis(&self, axis: AxisId) -> Vec2;
}

/// Input state for one tick, filled in by the input collaborator.
#[derive(Resource, Clone, Debug, Default)]
pub struct InputFrame {
    pressed: HashSet<Action>,
    held: HashSet<Action>,
    axes: HashMap<AxisId, Vec2>,
}

impl InputFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(mut self, action: Action) -> Self {
        self.pressed.insert(action);
        self
    }

    pub fn hold(mut self, action: Action) -> Self {
        self.held.insert(action);
        self
    }

    pub fn with_axis(mut self, axis: AxisId, value: Vec2) -> Self {
        self.axes.insert(axis, value);
        self
    }

    pub fn set_pressed(&mut self, action: Action, pressed: bool) {
        if pressed {
            self.pressed.insert(action);
        } else {
            self.pressed.remove(&action);
        }
    }

    pub fn set_held(&mut self, action: Action, held: bool) {
        if held {
            self.held.insert(action);
        } else {
            self.held.remove(&action);
        }
    }

    pub fn set_axis(&mut self, axis: AxisId, value: Vec2) {
        self.axes.insert(axis, value);
    }

    /// Forget single-fire presses once they have been consumed.
    pub fn clear_pressed(&mut self) {
        self.pressed.clear();
    }
}

impl PlacementInput for InputFrame {
    fn action_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    fn action_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    fn axis(&self, axis: AxisId) -> Vec2 {
        self.axes.get(&axis).copied().unwrap_or(Vec2::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_axis_is_zero() {
        let frame = InputFrame::new();
        assert_eq!(frame.axis(AxisId::Rotate), Vec2::ZERO);
    }

    #[test]
    fn clear_pressed_keeps_held_buttons() {
        let mut frame = InputFrame::new().press(Action::Place).hold(Action::Modify);
        frame.clear_pressed();
        assert!(!frame.action_pressed(Action::Place));
        assert!(frame.action_held(Action::Modify));
    }
}
