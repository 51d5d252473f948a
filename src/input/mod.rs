//! Input handling: event types, key bindings, and the input processor
//! that converts raw window events into engine commands.

/// Pointer events and the winit translation.
pub mod event;
/// Bindable actions and their key codes.
pub mod keyboard;
/// Converts raw events into engine commands.
pub mod processor;

pub use event::InputEvent;
pub use keyboard::{KeyAction, KeyBindings};
pub use processor::InputProcessor;
