//! The engine's complete interactive vocabulary.
//!
//! Every user-facing operation, whether triggered by a key press, a mouse
//! gesture or a programmatic call, is a `ScatterCommand` passed to
//! [`ScatterEngine::execute`](super::ScatterEngine::execute).

use glam::Vec2;

use crate::options::{Options, ParticleOptions};

/// One user action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScatterCommand {
    // ── Camera ──────────────────────────────────────────────────────
    /// Rotate the camera by `delta` pixels of mouse movement.
    RotateCamera {
        /// Horizontal and vertical drag delta.
        delta: Vec2,
    },

    /// Pan the camera by `delta` pixels of mouse movement.
    PanCamera {
        /// Horizontal and vertical drag delta.
        delta: Vec2,
    },

    /// Zoom the camera (positive = zoom in, negative = zoom out).
    Zoom {
        /// Scroll amount.
        delta: f32,
    },

    /// Return to the configured eye position.
    ResetCamera,

    // ── Scene ───────────────────────────────────────────────────────
    /// Switch to the next surface shape.
    CycleShape,

    /// Switch to the next instanced model.
    CycleModel,

    /// Double the particle count (capped).
    MoreParticles,

    /// Halve the particle count (at least one).
    FewerParticles,

    /// Show or hide the instances.
    ToggleParticles,

    /// Draw new random points on the current surface.
    Resample,

    // ── Diagnostics ─────────────────────────────────────────────────
    /// Start or stop the periodic frame-rate log.
    TogglePerformance,
}

impl ScatterCommand {
    /// The options this command produces from `options`, or `None` when
    /// the command does not edit options.
    #[must_use]
    pub fn edit_options(self, options: &Options) -> Option<Options> {
        let mut next = options.clone();
        let particles = &mut next.particles;
        match self {
            Self::CycleShape => next.surface.shape = next.surface.shape.next(),
            Self::CycleModel => particles.model = particles.model.next(),
            Self::MoreParticles => {
                particles.count = particles
                    .count
                    .saturating_mul(2)
                    .min(ParticleOptions::MAX_COUNT);
            }
            Self::FewerParticles => {
                particles.count = (particles.count / 2).max(ParticleOptions::MIN_COUNT);
            }
            Self::ToggleParticles => particles.visible = !particles.visible,
            Self::TogglePerformance => {
                next.debug.show_performance = !next.debug.show_performance;
            }
            Self::RotateCamera { .. }
            | Self::PanCamera { .. }
            | Self::Zoom { .. }
            | Self::ResetCamera
            | Self::Resample => return None,
        }
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetKind;
    use crate::surface::ShapeKind;

    #[test]
    fn cycling_walks_every_choice() {
        let mut options = Options::default();
        let mut shapes = vec![options.surface.shape];
        for _ in 0..ShapeKind::ALL.len() {
            options = ScatterCommand::CycleShape.edit_options(&options).unwrap();
            shapes.push(options.surface.shape);
        }
        assert_eq!(shapes.first(), shapes.last());
        assert_eq!(shapes[1], ShapeKind::Cube);

        let options = ScatterCommand::CycleModel
            .edit_options(&Options::default())
            .unwrap();
        assert_eq!(options.particles.model, AssetKind::Grass);
    }

    #[test]
    fn particle_count_stays_in_range() {
        let mut options = Options::default();
        options.particles.count = 70_000;
        let more = ScatterCommand::MoreParticles.edit_options(&options).unwrap();
        assert_eq!(more.particles.count, ParticleOptions::MAX_COUNT);

        options.particles.count = 1;
        let fewer = ScatterCommand::FewerParticles.edit_options(&options).unwrap();
        assert_eq!(fewer.particles.count, 1);
        assert!(fewer.validate().is_ok());
    }

    #[test]
    fn camera_commands_leave_options_alone() {
        let options = Options::default();
        assert!(ScatterCommand::Zoom { delta: 1.0 }.edit_options(&options).is_none());
        assert!(ScatterCommand::Resample.edit_options(&options).is_none());
        let hidden = ScatterCommand::ToggleParticles.edit_options(&options).unwrap();
        assert!(!hidden.particles.visible);
    }
}
