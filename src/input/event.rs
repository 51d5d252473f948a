use glam::Vec2;

/// Pointer input the camera cares about, independent of the windowing
/// crate.
///
/// Only the primary button drags; other buttons never reach the
/// [`InputProcessor`](super::InputProcessor).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Cursor position in physical pixels.
    Cursor(Vec2),
    /// Primary button went down (`true`) or up.
    Drag(bool),
    /// Wheel movement in lines; positive zooms in.
    Wheel(f32),
    /// Shift held (`true`) or released.
    Shift(bool),
}

/// Pixels of touchpad scroll that count as one wheel line.
#[cfg(feature = "viewer")]
const PIXELS_PER_LINE: f32 = 100.0;

#[cfg(feature = "viewer")]
impl InputEvent {
    /// Translate a winit window event. Events the scene ignores map to
    /// `None`; keyboard input goes through [`key_press`] instead.
    #[must_use]
    pub fn from_window_event(event: &winit::event::WindowEvent) -> Option<Self> {
        use winit::event::{ElementState, MouseButton, WindowEvent};

        match event {
            WindowEvent::CursorMoved { position, .. } => Some(Self::Cursor(Vec2::new(
                position.x as f32,
                position.y as f32,
            ))),
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => Some(Self::Drag(*state == ElementState::Pressed)),
            WindowEvent::MouseWheel { delta, .. } => Some(Self::Wheel(wheel_lines(*delta))),
            WindowEvent::ModifiersChanged(modifiers) => {
                Some(Self::Shift(modifiers.state().shift_key()))
            }
            _ => None,
        }
    }
}

#[cfg(feature = "viewer")]
fn wheel_lines(delta: winit::event::MouseScrollDelta) -> f32 {
    match delta {
        winit::event::MouseScrollDelta::LineDelta(_, y) => y,
        winit::event::MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
    }
}

/// Key-binding name of a fresh key press (`"KeyS"`, `"Space"`), or `None`
/// for releases, auto-repeat and keys without a physical code.
#[cfg(feature = "viewer")]
#[must_use]
pub fn key_press(event: &winit::event::KeyEvent) -> Option<String> {
    use winit::keyboard::PhysicalKey;

    if event.state != winit::event::ElementState::Pressed || event.repeat {
        return None;
    }
    match event.physical_key {
        PhysicalKey::Code(code) => Some(format!("{code:?}")),
        PhysicalKey::Unidentified(_) => None,
    }
}

#[cfg(all(test, feature = "viewer"))]
mod tests {
    use winit::dpi::PhysicalPosition;
    use winit::event::MouseScrollDelta;
    use winit::keyboard::KeyCode;

    use super::*;

    #[test]
    fn touchpad_pixels_scale_to_lines() {
        assert_eq!(wheel_lines(MouseScrollDelta::LineDelta(0.0, 2.0)), 2.0);
        let pixels = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -150.0));
        assert!((wheel_lines(pixels) + 1.5).abs() < 1e-6);
    }

    #[test]
    fn key_codes_format_as_binding_names() {
        // Bindings are stored as the `KeyCode` debug names.
        assert_eq!(format!("{:?}", KeyCode::KeyS), "KeyS");
        assert_eq!(format!("{:?}", KeyCode::Space), "Space");
    }
}
