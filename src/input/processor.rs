//! Converts raw platform events into engine commands.
//!
//! The `InputProcessor` owns all transient input state (cursor position,
//! button and modifier state) and the key-binding map. It is the only
//! thing that sits between raw window events and
//! [`ScatterEngine::execute`](crate::engine::ScatterEngine::execute).

use glam::Vec2;

use super::event::InputEvent;
use super::keyboard::KeyBindings;
use crate::engine::command::ScatterCommand;

/// Converts raw window events into [`ScatterCommand`]s.
///
/// Left drag rotates, shift + left drag pans, the wheel zooms.
#[derive(Debug, Default)]
pub struct InputProcessor {
    /// Last cursor position; `None` until the first move.
    mouse_pos: Option<Vec2>,
    /// Whether the primary mouse button is currently held.
    mouse_pressed: bool,
    /// Whether the shift modifier is currently held.
    shift_pressed: bool,
    /// Action → key mapping.
    key_bindings: KeyBindings,
}

impl InputProcessor {
    /// Create a new processor with default key bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a processor with custom key bindings.
    #[must_use]
    pub fn with_key_bindings(key_bindings: KeyBindings) -> Self {
        Self {
            key_bindings,
            ..Self::default()
        }
    }

    /// Whether the primary mouse button is pressed.
    #[must_use]
    pub fn mouse_pressed(&self) -> bool {
        self.mouse_pressed
    }

    /// Read-only access to the key bindings.
    #[must_use]
    pub fn key_bindings(&self) -> &KeyBindings {
        &self.key_bindings
    }

    /// Replace the key bindings (e.g. after loading a preset).
    pub fn set_key_bindings(&mut self, key_bindings: KeyBindings) {
        self.key_bindings = key_bindings;
    }

    /// Look up a key press and return the corresponding command, if bound.
    #[must_use]
    pub fn handle_key_press(&self, key: &str) -> Option<ScatterCommand> {
        self.key_bindings.lookup(key).map(super::KeyAction::command)
    }

    /// Process a pointer event and return zero or one commands.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<ScatterCommand> {
        match event {
            InputEvent::Cursor(pos) => self.handle_cursor_moved(pos),
            InputEvent::Drag(pressed) => {
                self.mouse_pressed = pressed;
                None
            }
            InputEvent::Wheel(delta) => Some(ScatterCommand::Zoom { delta }),
            InputEvent::Shift(held) => {
                self.shift_pressed = held;
                None
            }
        }
    }

    fn handle_cursor_moved(&mut self, pos: Vec2) -> Option<ScatterCommand> {
        let last = self.mouse_pos.replace(pos)?;
        if !self.mouse_pressed {
            return None;
        }
        let delta = pos - last;
        if self.shift_pressed {
            Some(ScatterCommand::PanCamera { delta })
        } else {
            Some(ScatterCommand::RotateCamera { delta })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::Cursor(Vec2::new(x, y))
    }

    #[test]
    fn drag_rotates_and_shift_drag_pans() {
        let mut input = InputProcessor::new();
        assert_eq!(input.handle_event(moved(10.0, 10.0)), None);
        assert_eq!(input.handle_event(moved(12.0, 10.0)), None);

        let _ = input.handle_event(InputEvent::Drag(true));
        assert!(input.mouse_pressed());
        assert_eq!(
            input.handle_event(moved(15.0, 6.0)),
            Some(ScatterCommand::RotateCamera {
                delta: Vec2::new(3.0, -4.0)
            })
        );

        let _ = input.handle_event(InputEvent::Shift(true));
        assert_eq!(
            input.handle_event(moved(16.0, 6.0)),
            Some(ScatterCommand::PanCamera {
                delta: Vec2::new(1.0, 0.0)
            })
        );

        let _ = input.handle_event(InputEvent::Drag(false));
        assert_eq!(input.handle_event(moved(20.0, 6.0)), None);
    }

    #[test]
    fn first_press_before_any_move_does_not_jump() {
        let mut input = InputProcessor::new();
        let _ = input.handle_event(InputEvent::Drag(true));
        assert_eq!(input.handle_event(moved(300.0, 200.0)), None);
        assert!(input.handle_event(moved(301.0, 200.0)).is_some());
    }

    #[test]
    fn wheel_zooms_and_keys_map_to_actions() {
        let mut input = InputProcessor::new();
        assert_eq!(
            input.handle_event(InputEvent::Wheel(1.5)),
            Some(ScatterCommand::Zoom { delta: 1.5 })
        );
        assert_eq!(input.handle_key_press("Space"), Some(ScatterCommand::Resample));
        assert_eq!(input.handle_key_press("KeyS"), Some(ScatterCommand::CycleShape));
        assert_eq!(input.handle_key_press("F13"), None);
    }
}
