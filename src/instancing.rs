//! Per-point transforms for the instanced model batch.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{EulerRot, Mat4, Quat, Vec3};
use rand::Rng;

use crate::assets::{AssetKind, LoadedAsset};
use crate::options::ParticleOptions;
use crate::sampling::SampledPoints;

/// Per-instance model matrix as uploaded to the GPU.
/// Must match the WGSL `InstanceInput` layout (64 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    /// Column-major world matrix.
    pub model: [[f32; 4]; 4],
}

impl InstanceRaw {
    /// Identity transform.
    pub const IDENTITY: Self = Self {
        model: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Pack a matrix.
    #[must_use]
    pub fn from_mat4(m: &Mat4) -> Self {
        Self {
            model: m.to_cols_array_2d(),
        }
    }

    /// Vertex buffer layout for slot 1 (one step per instance, locations
    /// 3..=6 hold the four matrix columns).
    pub fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
            3 => Float32x4,
            4 => Float32x4,
            5 => Float32x4,
            6 => Float32x4,
        ];
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Local transform of one instance: uniform `scale`, tipped upright by
/// -90° about X, spun by `spin` about the model's own up axis, then moved to
/// `position`.
#[must_use]
pub fn instance_transform(position: Vec3, scale: f32, spin: f32) -> Mat4 {
    Mat4::from_scale_rotation_translation(
        Vec3::splat(scale),
        Quat::from_euler(EulerRot::XYZ, -FRAC_PI_2, spin, 0.0),
        position,
    )
}

/// One batched, instanced draw of a single model.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceBatch {
    kind: AssetKind,
    instances: Vec<Mat4>,
    root: Mat4,
    scale: f32,
    visible: bool,
}

impl InstanceBatch {
    /// Lay out `particles.count` instances of `asset` on `points`.
    ///
    /// Every slot that has a point gets a transform with a fresh random
    /// spin from `rng`; slots beyond the available points stay at identity.
    /// Returns `None` while the asset is not loaded.
    pub fn build<R: Rng>(
        points: &SampledPoints,
        particles: &ParticleOptions,
        asset: Option<&LoadedAsset>,
        root: Mat4,
        rng: &mut R,
    ) -> Option<Self> {
        let asset = asset?;
        let count = particles.count as usize;
        let mut instances = vec![Mat4::IDENTITY; count];
        for (slot, position) in instances.iter_mut().zip(points.positions()) {
            let spin = rng.random_range(0.0..TAU);
            *slot = instance_transform(position, particles.size, spin);
        }
        Some(Self {
            kind: asset.kind,
            instances,
            root,
            scale: particles.size,
            visible: particles.visible,
        })
    }

    /// Model drawn by this batch.
    #[must_use]
    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    /// Number of instance slots (equals the configured count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// `true` for a zero-capacity batch.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Per-instance transforms relative to the root.
    #[must_use]
    pub fn instances(&self) -> &[Mat4] {
        &self.instances
    }

    /// Transform shared by the whole batch (the surface placement).
    #[must_use]
    pub fn root(&self) -> Mat4 {
        self.root
    }

    /// Uniform instance scale.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Whether the batch is drawn.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide without rebuilding.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// `root × instance` for every slot, ready for upload.
    #[must_use]
    pub fn world_instances(&self) -> Vec<InstanceRaw> {
        self.instances
            .iter()
            .map(|m| InstanceRaw::from_mat4(&(self.root * *m)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::gpu::backend::MaterialDesc;
    use crate::options::SurfaceOptions;
    use crate::sampling::PointSampler;
    use crate::surface::{primitives, Surface};

    fn rock() -> LoadedAsset {
        LoadedAsset {
            kind: AssetKind::Rock,
            mesh: primitives::cube(1.0),
            material: MaterialDesc::default(),
        }
    }

    #[test]
    fn instance_raw_is_64_bytes() {
        assert_eq!(size_of::<InstanceRaw>(), 64);
        assert_eq!(InstanceRaw::from_mat4(&Mat4::IDENTITY), InstanceRaw::IDENTITY);
    }

    #[test]
    fn no_asset_no_batch() {
        let points = PointSampler::seeded(0).sample(
            Some(&primitives::plane(5.0)),
            10,
        );
        let mut rng = StdRng::seed_from_u64(0);
        let batch = InstanceBatch::build(
            &points,
            &ParticleOptions::default(),
            None,
            Mat4::IDENTITY,
            &mut rng,
        );
        assert!(batch.is_none());
    }

    #[test]
    fn instances_sit_on_their_points() {
        let surface = Surface::build(&SurfaceOptions::default());
        let mut sampler = PointSampler::seeded(5);
        let points = sampler.sample(Some(surface.mesh()), 25);
        let particles = ParticleOptions {
            count: 25,
            size: 0.5,
            ..ParticleOptions::default()
        };
        let batch = InstanceBatch::build(
            &points,
            &particles,
            Some(&rock()),
            surface.transform(),
            sampler.rng_mut(),
        )
        .unwrap();

        assert_eq!(batch.len(), 25);
        assert_eq!(batch.kind(), AssetKind::Rock);
        let world = points.to_world(&surface.transform());
        for (raw, expected) in batch.world_instances().iter().zip(world) {
            let m = Mat4::from_cols_array_2d(&raw.model);
            let (scale, _, translation) = m.to_scale_rotation_translation();
            assert!((translation - expected).length() < 1e-4);
            assert!((scale - Vec3::splat(0.5)).length() < 1e-4);
        }
    }

    #[test]
    fn missing_points_leave_identity_slots() {
        let points = PointSampler::seeded(6).sample(Some(&primitives::cube(1.0)), 3);
        let particles = ParticleOptions {
            count: 5,
            ..ParticleOptions::default()
        };
        let mut rng = StdRng::seed_from_u64(6);
        let batch =
            InstanceBatch::build(&points, &particles, Some(&rock()), Mat4::IDENTITY, &mut rng)
                .unwrap();
        assert_eq!(batch.len(), 5);
        assert_ne!(batch.instances()[2], Mat4::IDENTITY);
        assert_eq!(batch.instances()[3], Mat4::IDENTITY);
        assert_eq!(batch.instances()[4], Mat4::IDENTITY);
    }

    #[test]
    fn transform_stands_model_upright() {
        // Model +Z maps to world +Y.
        let m = instance_transform(Vec3::ZERO, 1.0, 0.0);
        let up = m.transform_vector3(Vec3::Z);
        assert!((up - Vec3::Y).length() < 1e-6);
        assert!(m.transform_vector3(Vec3::Y).y.abs() < 1e-6);
    }

    #[test]
    fn visibility_toggles_in_place() {
        let points = SampledPoints::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut batch = InstanceBatch::build(
            &points,
            &ParticleOptions::default(),
            Some(&rock()),
            Mat4::IDENTITY,
            &mut rng,
        )
        .unwrap();
        assert!(batch.is_visible());
        batch.set_visible(false);
        assert!(!batch.is_visible());
        assert_eq!(batch.len(), 200);
    }
}
