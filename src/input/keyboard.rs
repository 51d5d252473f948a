use serde::{Deserialize, Serialize};

use crate::engine::command::ScatterCommand;

/// Scene actions that can be bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Next surface shape.
    CycleShape,
    /// Next instanced model.
    CycleModel,
    /// Double the particle count.
    MoreParticles,
    /// Halve the particle count.
    FewerParticles,
    /// Show or hide the instances.
    ToggleParticles,
    /// Draw new random points.
    Resample,
    /// Start or stop the periodic frame-rate log.
    TogglePerformance,
    /// Return the camera to its starting view.
    ResetCamera,
}

impl KeyAction {
    /// Every bindable action.
    pub const ALL: [Self; 8] = [
        Self::CycleShape,
        Self::CycleModel,
        Self::MoreParticles,
        Self::FewerParticles,
        Self::ToggleParticles,
        Self::Resample,
        Self::TogglePerformance,
        Self::ResetCamera,
    ];

    /// The parameterless command this action issues.
    #[must_use]
    pub fn command(self) -> ScatterCommand {
        match self {
            Self::CycleShape => ScatterCommand::CycleShape,
            Self::CycleModel => ScatterCommand::CycleModel,
            Self::MoreParticles => ScatterCommand::MoreParticles,
            Self::FewerParticles => ScatterCommand::FewerParticles,
            Self::ToggleParticles => ScatterCommand::ToggleParticles,
            Self::Resample => ScatterCommand::Resample,
            Self::TogglePerformance => ScatterCommand::TogglePerformance,
            Self::ResetCamera => ScatterCommand::ResetCamera,
        }
    }
}

/// Key code per action, in the `winit::keyboard::KeyCode` debug format
/// (`"KeyS"`, `"Space"`, `"Equal"`).
///
/// One field per action keeps TOML presets readable:
/// ```toml
/// [keybindings]
/// cycle_shape = "KeyS"
/// resample = "Space"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KeyBindings {
    /// Next surface shape.
    pub cycle_shape: String,
    /// Next instanced model.
    pub cycle_model: String,
    /// Double the particle count.
    pub more_particles: String,
    /// Halve the particle count.
    pub fewer_particles: String,
    /// Show or hide the instances.
    pub toggle_particles: String,
    /// New random points.
    pub resample: String,
    /// Periodic frame-rate log on/off.
    pub toggle_performance: String,
    /// Camera back to its configured eye.
    pub reset_camera: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            cycle_shape: "KeyS".into(),
            cycle_model: "KeyM".into(),
            more_particles: "Equal".into(),
            fewer_particles: "Minus".into(),
            toggle_particles: "KeyV".into(),
            resample: "Space".into(),
            toggle_performance: "KeyP".into(),
            reset_camera: "KeyQ".into(),
        }
    }
}

impl KeyBindings {
    /// Key bound to `action`.
    #[must_use]
    pub fn key_for(&self, action: KeyAction) -> &str {
        match action {
            KeyAction::CycleShape => &self.cycle_shape,
            KeyAction::CycleModel => &self.cycle_model,
            KeyAction::MoreParticles => &self.more_particles,
            KeyAction::FewerParticles => &self.fewer_particles,
            KeyAction::ToggleParticles => &self.toggle_particles,
            KeyAction::Resample => &self.resample,
            KeyAction::TogglePerformance => &self.toggle_performance,
            KeyAction::ResetCamera => &self.reset_camera,
        }
    }

    /// Action bound to a physical key string, if any.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<KeyAction> {
        KeyAction::ALL
            .into_iter()
            .find(|&action| self.key_for(action) == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_inverse_of_key_for() {
        let bindings = KeyBindings::default();
        for action in KeyAction::ALL {
            assert_eq!(bindings.lookup(bindings.key_for(action)), Some(action));
        }
        assert_eq!(bindings.lookup("KeyZ"), None);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let bindings: KeyBindings = toml::from_str("resample = \"KeyR\"").unwrap();
        assert_eq!(bindings.lookup("KeyR"), Some(KeyAction::Resample));
        assert_eq!(bindings.lookup("Space"), None);
        assert_eq!(bindings.lookup("KeyS"), Some(KeyAction::CycleShape));
    }
}
