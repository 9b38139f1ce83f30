//! # Snapshot Advance Benchmark
//!
//! Measures one full advance pass over every tracked entity, sequential
//! versus rayon, plus the render-side sampling pass.
//!
//! Run with: `cargo bench --package meridian_core`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use meridian_core::{SnapshotStore, TickAdvancer, TickContext, World};
use meridian_shared::{Quaternion, Transform, Vec3};

fn populated(count: usize) -> (World, SnapshotStore) {
    let mut world = World::new(count);
    let mut store = SnapshotStore::new(count);
    for i in 0..count {
        let f = i as f32;
        let pose = Transform::new(
            Vec3::new(f * 0.1, f * 0.2, f * 0.3),
            Quaternion::from_axis_angle(Vec3::Y, f * 0.01),
            1.0,
        );
        let id = world.spawn_with_transform(pose);
        store.attach(id, pose, 0);
    }
    (world, store)
}

fn bench_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance");

    for count in [10_000, 100_000, 1_000_000] {
        let (world, mut store) = populated(count);

        group.bench_with_input(BenchmarkId::new("sequential", count), &count, |b, _| {
            let mut advancer = TickAdvancer::new();
            let mut tick = 0u32;
            b.iter(|| {
                tick += 1;
                black_box(advancer.advance(&mut store, &world, TickContext::running(tick)))
            });
        });

        let (world, mut store) = populated(count);
        group.bench_with_input(BenchmarkId::new("parallel", count), &count, |b, _| {
            let mut advancer = TickAdvancer::new();
            let mut tick = 0u32;
            b.iter(|| {
                tick += 1;
                black_box(advancer.advance_parallel(&mut store, &world, TickContext::running(tick)))
            });
        });
    }

    group.finish();
}

fn bench_sample(c: &mut Criterion) {
    let (world, store) = populated(100_000);
    let ids: Vec<_> = world.iter_alive().collect();

    c.bench_function("sample_100k", |b| {
        b.iter(|| {
            let mut sum = 0.0f32;
            for &id in &ids {
                if let Some(pose) = store.sample(id, black_box(0.37)) {
                    sum += pose.position.x;
                }
            }
            sum
        });
    });
}

criterion_group!(benches, bench_advance, bench_sample);
criterion_main!(benches);
