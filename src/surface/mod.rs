//! Base surfaces that particles are scattered across.
//!
//! A [`Surface`] is rebuilt from scratch whenever any of its parameters
//! change; it owns the generated [`MeshData`] and the placement transform.
//! Graphics resources for the surface are owned by
//! [`ScatterScene`](crate::scene::ScatterScene), not by the surface itself.

pub mod mesh;
pub mod primitives;

use std::fmt;
use std::str::FromStr;

use glam::{EulerRot, Mat4, Quat, Vec3};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use mesh::{MeshData, MeshVertex};

use crate::error::ScatterError;
use crate::options::SurfaceOptions;

/// Primitive shape used as the scatter surface.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Flat square.
    #[default]
    Plane,
    /// Axis-aligned cube.
    Cube,
    /// UV sphere.
    Sphere,
    /// Closed cone.
    Cone,
}

impl ShapeKind {
    /// Every supported shape, in panel order.
    pub const ALL: [Self; 4] = [Self::Plane, Self::Cube, Self::Sphere, Self::Cone];

    /// Lowercase name, also used as the surface's tag.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Plane => "plane",
            Self::Cube => "cube",
            Self::Sphere => "sphere",
            Self::Cone => "cone",
        }
    }

    /// The shape after this one in panel order (wraps around).
    #[must_use]
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// Generate this shape's mesh for the given size.
    #[must_use]
    pub fn generate(self, size: f32) -> MeshData {
        match self {
            Self::Plane => primitives::plane(size),
            Self::Cube => primitives::cube(size),
            Self::Sphere => primitives::sphere(
                size / 2.0,
                primitives::SPHERE_SEGMENTS,
                primitives::SPHERE_SEGMENTS,
            ),
            Self::Cone => primitives::cone(
                size / 2.0,
                size,
                primitives::CONE_RADIAL_SEGMENTS,
            ),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = ScatterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ScatterError::UnknownShape(s.to_owned()))
    }
}

/// Placement transform: translation on the ground plane (y = 0) followed by
/// an XYZ Euler rotation given in degrees.
#[must_use]
pub fn placement_transform(position: [f32; 2], rotation_deg: [f32; 3]) -> Mat4 {
    let [rx, ry, rz] = rotation_deg.map(f32::to_radians);
    Mat4::from_rotation_translation(
        Quat::from_euler(EulerRot::XYZ, rx, ry, rz),
        Vec3::new(position[0], 0.0, position[1]),
    )
}

/// A built scatter surface.
#[derive(Debug, Clone)]
pub struct Surface {
    kind: ShapeKind,
    size: f32,
    transform: Mat4,
    mesh: MeshData,
    cast_shadow: bool,
}

impl Surface {
    /// Build a surface from panel options.
    #[must_use]
    pub fn build(options: &SurfaceOptions) -> Self {
        let mesh = options.shape.generate(options.size);
        let transform = placement_transform(
            [options.position.x, options.position.z],
            [options.rotation.x, options.rotation.y, options.rotation.z],
        );
        log::debug!(
            "built {} surface: {} vertices, {} triangles",
            options.shape,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Self {
            kind: options.shape,
            size: options.size,
            transform,
            mesh,
            cast_shadow: true,
        }
    }

    /// Shape of this surface.
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Tag name (the shape name).
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Size the surface was built with.
    #[must_use]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Local-to-world transform.
    #[must_use]
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    /// Generated mesh in local space.
    #[must_use]
    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    /// Whether the surface casts shadows.
    #[must_use]
    pub fn casts_shadow(&self) -> bool {
        self.cast_shadow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Placement, Rotation};

    #[test]
    fn every_shape_has_valid_indices() {
        for kind in ShapeKind::ALL {
            let surface = Surface::build(&SurfaceOptions {
                shape: kind,
                ..SurfaceOptions::default()
            });
            let mesh = surface.mesh();
            assert!(mesh.triangle_count() > 0, "{kind} has no triangles");
            assert!(mesh.indices_in_bounds(), "{kind} index out of bounds");
            assert_eq!(surface.name(), kind.name());
            assert!(surface.casts_shadow());
        }
    }

    #[test]
    fn shape_names_parse_case_insensitively() {
        assert_eq!("Sphere".parse::<ShapeKind>().unwrap(), ShapeKind::Sphere);
        assert_eq!(" cone ".parse::<ShapeKind>().unwrap(), ShapeKind::Cone);
        let err = "torus".parse::<ShapeKind>().unwrap_err();
        assert!(matches!(err, ScatterError::UnknownShape(ref s) if s == "torus"));
    }

    #[test]
    fn next_cycles_through_all_shapes() {
        let mut kind = ShapeKind::Plane;
        for _ in 0..ShapeKind::ALL.len() {
            kind = kind.next();
        }
        assert_eq!(kind, ShapeKind::Plane);
    }

    #[test]
    fn default_rotation_lays_plane_flat() {
        let surface = Surface::build(&SurfaceOptions::default());
        let world = surface.transform();
        for p in &surface.mesh().positions {
            let w = world.transform_point3(Vec3::from(*p));
            assert!(w.y.abs() < 1e-5);
        }
    }

    #[test]
    fn placement_moves_along_ground() {
        let surface = Surface::build(&SurfaceOptions {
            position: Placement { x: 3.0, z: -2.0 },
            rotation: Rotation { x: 0.0, y: 0.0, z: 0.0 },
            ..SurfaceOptions::default()
        });
        let origin = surface.transform().transform_point3(Vec3::ZERO);
        assert_eq!(origin, Vec3::new(3.0, 0.0, -2.0));
    }
}
