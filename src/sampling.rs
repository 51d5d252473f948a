//! Random points on triangle meshes.
//!
//! A triangle is chosen uniformly by *index* (not by area, so small
//! triangles get as many points as large ones), then three independent
//! uniform draws are normalized into barycentric weights.

use glam::{Mat4, Vec3};
use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

use crate::surface::MeshData;

/// One sampled point and how it was produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    /// Point in mesh-local space.
    pub position: Vec3,
    /// Triangle the point lies on.
    pub triangle: usize,
    /// Barycentric weights of the triangle's three corners (sum to 1).
    pub weights: [f32; 3],
}

/// Ordered result of one sampling pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampledPoints {
    samples: Vec<SurfaceSample>,
}

impl SampledPoints {
    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// `true` if no points were produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// All samples in order.
    #[must_use]
    pub fn samples(&self) -> &[SurfaceSample] {
        &self.samples
    }

    /// Positions in mesh-local space.
    pub fn positions(&self) -> impl ExactSizeIterator<Item = Vec3> + '_ {
        self.samples.iter().map(|s| s.position)
    }

    /// Flat `x0 y0 z0 x1 y1 z1 ...` buffer.
    #[must_use]
    pub fn flat(&self) -> Vec<f32> {
        self.samples
            .iter()
            .flat_map(|s| s.position.to_array())
            .collect()
    }

    /// One `[x, y, z]` triple per point.
    #[must_use]
    pub fn triples(&self) -> Vec<[f32; 3]> {
        self.positions().map(|p| p.to_array()).collect()
    }

    /// Positions mapped through `transform` (usually the surface's
    /// local-to-world matrix).
    #[must_use]
    pub fn to_world(&self, transform: &Mat4) -> Vec<Vec3> {
        self.positions()
            .map(|p| transform.transform_point3(p))
            .collect()
    }
}

/// Barycentric point sampler over any random source.
#[derive(Debug, Clone)]
pub struct PointSampler<R> {
    rng: R,
}

impl PointSampler<ThreadRng> {
    /// Sampler backed by the thread-local generator.
    #[must_use]
    pub fn new() -> Self {
        Self { rng: rand::rng() }
    }
}

impl Default for PointSampler<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl PointSampler<StdRng> {
    /// Deterministic sampler for reproducible layouts.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> PointSampler<R> {
    /// Sampler drawing from `rng`.
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }

    /// The underlying generator, shared with instance placement.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Sample `count` points on `mesh`.
    ///
    /// An absent mesh, a mesh without a complete triangle or a mesh whose
    /// indices point past its vertices yields an empty set.
    pub fn sample(&mut self, mesh: Option<&MeshData>, count: usize) -> SampledPoints {
        let Some(mesh) = mesh else {
            return SampledPoints::default();
        };
        let triangles = mesh.triangle_count();
        if triangles == 0 || count == 0 {
            return SampledPoints::default();
        }
        if !mesh.indices_in_bounds() {
            log::warn!("refusing to sample a mesh with out-of-range indices");
            return SampledPoints::default();
        }

        let mut samples = Vec::with_capacity(count);
        while samples.len() < count {
            let triangle = self.rng.random_range(0..triangles);
            let Some([a, b, c]) = mesh.triangle(triangle) else {
                continue;
            };
            let weights = self.weights();
            samples.push(SurfaceSample {
                position: a * weights[0] + b * weights[1] + c * weights[2],
                triangle,
                weights,
            });
        }
        SampledPoints { samples }
    }

    fn weights(&mut self) -> [f32; 3] {
        let raw: [f32; 3] = [self.rng.random(), self.rng.random(), self.rng.random()];
        let sum: f32 = raw.iter().sum();
        if sum > 0.0 {
            raw.map(|w| w / sum)
        } else {
            [1.0 / 3.0; 3]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::SurfaceOptions;
    use crate::surface::{ShapeKind, Surface};

    #[test]
    fn yields_exactly_the_requested_count() {
        let mut sampler = PointSampler::seeded(1);
        for kind in ShapeKind::ALL {
            let mesh = kind.generate(5.0);
            for n in [0, 1, 17, 1000] {
                assert_eq!(sampler.sample(Some(&mesh), n).len(), n, "{kind} n={n}");
            }
        }
    }

    #[test]
    fn missing_or_empty_mesh_gives_no_points() {
        let mut sampler = PointSampler::seeded(2);
        assert!(sampler.sample(None, 10).is_empty());
        assert!(sampler.sample(Some(&MeshData::default()), 10).is_empty());

        let mut partial = ShapeKind::Plane.generate(1.0);
        partial.indices.truncate(2);
        assert!(sampler.sample(Some(&partial), 10).is_empty());
    }

    #[test]
    fn dangling_indices_after_last_triangle_are_skipped() {
        let mut mesh = ShapeKind::Plane.generate(1.0);
        mesh.indices.extend([0, 1]);
        let points = PointSampler::seeded(9).sample(Some(&mesh), 25);
        assert_eq!(points.len(), 25);
        assert!(points.samples().iter().all(|s| s.triangle < 2));
    }

    #[test]
    fn points_are_convex_combinations_of_their_triangle() {
        let mesh = ShapeKind::Sphere.generate(4.0);
        let points = PointSampler::seeded(3).sample(Some(&mesh), 500);
        for s in points.samples() {
            let sum: f32 = s.weights.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
            assert!(s.weights.iter().all(|&w| (0.0..=1.0).contains(&w)));

            let [a, b, c] = mesh.triangle(s.triangle).unwrap();
            let expected = a * s.weights[0] + b * s.weights[1] + c * s.weights[2];
            assert!((s.position - expected).length() < 1e-5);

            let lo = a.min(b).min(c) - Vec3::splat(1e-5);
            let hi = a.max(b).max(c) + Vec3::splat(1e-5);
            assert!(s.position.cmpge(lo).all() && s.position.cmple(hi).all());
        }
    }

    #[test]
    fn repeated_sampling_differs_but_matches_in_distribution() {
        let mesh = ShapeKind::Plane.generate(5.0);
        let a = PointSampler::seeded(10).sample(Some(&mesh), 4000);
        let b = PointSampler::seeded(11).sample(Some(&mesh), 4000);
        assert_eq!(a.len(), b.len());
        assert_ne!(a, b);

        let mean = |p: &SampledPoints| p.positions().sum::<Vec3>() / p.len() as f32;
        let (ma, mb) = (mean(&a), mean(&b));
        assert!(ma.abs().max_element() < 0.2, "{ma}");
        assert!(mb.abs().max_element() < 0.2, "{mb}");
        assert!((ma - mb).length() < 0.25);
    }

    #[test]
    fn default_plane_points_lie_flat_in_world_space() {
        let surface = Surface::build(&SurfaceOptions::default());
        let points = PointSampler::new().sample(Some(surface.mesh()), 10);
        assert_eq!(points.len(), 10);
        for p in points.to_world(&surface.transform()) {
            assert!(p.y.abs() < 1e-5, "{p}");
            assert!((-2.5..=2.5).contains(&p.x), "{p}");
            assert!((-2.5..=2.5).contains(&p.z), "{p}");
        }
    }

    #[test]
    fn flat_and_triples_agree() {
        let mesh = ShapeKind::Cube.generate(2.0);
        let points = PointSampler::seeded(4).sample(Some(&mesh), 7);
        let flat = points.flat();
        let triples = points.triples();
        assert_eq!(flat.len(), 21);
        assert_eq!(triples.len(), 7);
        for (i, t) in triples.iter().enumerate() {
            assert_eq!(&flat[i * 3..i * 3 + 3], t);
        }
    }
}
