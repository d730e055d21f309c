//! Benchmarks for scene construction and per-frame CPU work.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use backdrop::{
    BackgroundScene, FrameContext, ParticleDraw, ParticleField, RenderSurface, SphereDraw,
    SphereMesh,
};

/// Accepts every submission and does nothing with it.
struct NullSurface;

impl RenderSurface for NullSurface {
    type Error = ();

    fn begin_frame(&mut self, frame: &FrameContext) -> Result<(), ()> {
        black_box(frame);
        Ok(())
    }

    fn submit_particles(&mut self, draw: &ParticleDraw<'_>) {
        black_box(draw.model);
    }

    fn submit_sphere(&mut self, draw: &SphereDraw) {
        black_box(draw.model);
    }

    fn end_frame(&mut self) -> Result<(), ()> {
        Ok(())
    }
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");

    group.bench_function("particle_field", |b| {
        b.iter(|| black_box(ParticleField::with_seed(7)))
    });

    group.bench_function("portfolio_scene", |b| {
        b.iter(|| black_box(BackgroundScene::portfolio_builder().with_seed(7).build()))
    });

    group.bench_function("sphere_mesh", |b| b.iter(|| black_box(SphereMesh::background())));

    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    let mut scene = BackgroundScene::portfolio_builder().with_seed(7).build();
    let mut surface = NullSurface;
    let mut t = 0.0_f32;

    group.bench_function("submit", |b| {
        b.iter(|| {
            t += 1.0 / 60.0;
            scene.submit(black_box(t), &mut surface)
        })
    });

    group.bench_function("update", |b| b.iter(|| scene.update(black_box(12.5))));

    group.finish();
}

criterion_group!(benches, bench_construction, bench_frame);
criterion_main!(benches);
