//! Point sampling and instance batch construction.

// `criterion_group!` expands to an undocumented `pub fn`.
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Mat4;
use rand::rngs::StdRng;
use rand::SeedableRng;
use strew::assets::{AssetKind, LoadedAsset};
use strew::gpu::backend::MaterialDesc;
use strew::instancing::InstanceBatch;
use strew::options::ParticleOptions;
use strew::sampling::PointSampler;
use strew::surface::{primitives, ShapeKind};

fn sampling_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_points");
    for shape in [ShapeKind::Plane, ShapeKind::Sphere] {
        let mesh = shape.generate(5.0);
        for count in [200usize, 10_000, 100_000] {
            let mut sampler = PointSampler::seeded(7);
            group.bench_with_input(
                BenchmarkId::new(shape.name(), count),
                &count,
                |b, &count| b.iter(|| black_box(sampler.sample(Some(&mesh), count))),
            );
        }
    }
    group.finish();
}

fn batch_benchmark(c: &mut Criterion) {
    let mesh = ShapeKind::Sphere.generate(5.0);
    let points = PointSampler::seeded(11).sample(Some(&mesh), 10_000);
    let asset = LoadedAsset {
        kind: AssetKind::Rock,
        mesh: primitives::cube(1.0),
        material: MaterialDesc::default(),
    };
    let particles = ParticleOptions {
        count: 10_000,
        ..ParticleOptions::default()
    };
    let mut rng = StdRng::seed_from_u64(3);

    c.bench_function("build_batch_10k", |b| {
        b.iter(|| {
            black_box(InstanceBatch::build(
                &points,
                &particles,
                Some(&asset),
                Mat4::IDENTITY,
                &mut rng,
            ))
        })
    });

    let batch = InstanceBatch::build(&points, &particles, Some(&asset), Mat4::IDENTITY, &mut rng);
    c.bench_function("world_instances_10k", |b| {
        b.iter(|| black_box(batch.as_ref().map(InstanceBatch::world_instances)))
    });
}

criterion_group!(benches, sampling_benchmark, batch_benchmark);
criterion_main!(benches);
