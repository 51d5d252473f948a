use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::surface::ShapeKind;

/// Ground-plane position of the surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default, JsonSchema)]
#[schemars(title = "Position", inline)]
#[serde(default)]
pub struct Placement {
    /// X coordinate.
    #[schemars(title = "X", extend("step" = 0.01))]
    pub x: f32,
    /// Z coordinate.
    #[schemars(title = "Z", extend("step" = 0.01))]
    pub z: f32,
}

/// Euler rotation in degrees (applied X, then Y, then Z).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Rotation", inline)]
#[serde(default)]
pub struct Rotation {
    /// Rotation about X in degrees.
    #[schemars(title = "X", extend("step" = 1.0))]
    pub x: f32,
    /// Rotation about Y in degrees.
    #[schemars(title = "Y", extend("step" = 1.0))]
    pub y: f32,
    /// Rotation about Z in degrees.
    #[schemars(title = "Z", extend("step" = 1.0))]
    pub z: f32,
}

impl Default for Rotation {
    /// Lays the XY-plane primitives flat on the ground.
    fn default() -> Self {
        Self {
            x: 90.0,
            y: 0.0,
            z: 0.0,
        }
    }
}

/// Base surface the particles are scattered across.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Surfaces", inline)]
#[serde(default)]
pub struct SurfaceOptions {
    /// Primitive shape.
    #[schemars(title = "Model")]
    pub shape: ShapeKind,
    /// Edge length / diameter / height depending on the shape.
    #[schemars(title = "Size", range(min = 0.1, max = 10.0), extend("step" = 0.01))]
    pub size: f32,
    /// Position on the ground plane.
    #[schemars(title = "Position")]
    pub position: Placement,
    /// Orientation in degrees.
    #[schemars(title = "Rotation")]
    pub rotation: Rotation,
}

impl SurfaceOptions {
    /// Smallest accepted size.
    pub const MIN_SIZE: f32 = 0.1;
    /// Largest accepted size.
    pub const MAX_SIZE: f32 = 10.0;
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            shape: ShapeKind::Plane,
            size: 5.0,
            position: Placement::default(),
            rotation: Rotation::default(),
        }
    }
}
