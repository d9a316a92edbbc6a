use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use constel::configuration::config::GalaxyConfig;
use constel::simulation::scenario::{default_threads, generate_galaxy};
use constel::{Acceleration, DirectGravity, NVec2, Parameters, QuadTree, Star, TreeGravity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;

fn galaxy(count: usize) -> Vec<Star> {
    let cfg = GalaxyConfig {
        stars: count,
        seed: Some(42),
        ..Default::default()
    };
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    match generate_galaxy(&cfg, &mut rng) {
        Ok(store) => store.as_slice().to_vec(),
        Err(e) => panic!("galaxy generation failed: {e}"),
    }
}

// =============================================================================
// Tree construction
// =============================================================================

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_build");

    for &count in &[1_000, 10_000, 100_000] {
        let stars = galaxy(count);
        let mut tree = QuadTree::with_capacity(count);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("stars", count), &count, |b, _| {
            b.iter(|| {
                tree.build(black_box(&stars)).unwrap();
                tree.clear();
            });
        });
    }

    group.finish();
}

// =============================================================================
// Force evaluation
// =============================================================================

fn bench_forces(c: &mut Criterion) {
    let mut group = c.benchmark_group("forces");
    let params = Parameters::default();

    for &count in &[500, 2_000] {
        let stars = galaxy(count);
        let mut out = vec![NVec2::zeros(); count];
        let direct = DirectGravity { law: params.law() };
        let tree = TreeGravity::new(&params);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("direct", count), &count, |b, _| {
            b.iter(|| direct.acceleration(black_box(&stars), &mut out).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("tree", count), &count, |b, _| {
            b.iter(|| tree.acceleration(black_box(&stars), &mut out).unwrap());
        });
    }

    group.finish();
}

fn bench_accuracy(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_accuracy");
    let count = 10_000;
    let stars = galaxy(count);
    let mut out = vec![NVec2::zeros(); count];

    for &accuracy in &[0.5, 1.0, 2.0, 4.0] {
        let params = Parameters { accuracy, ..Default::default() };
        let tree = TreeGravity::new(&params);
        group.bench_with_input(BenchmarkId::new("accuracy", accuracy), &accuracy, |b, _| {
            b.iter(|| tree.acceleration(black_box(&stars), &mut out).unwrap());
        });
    }

    group.finish();
}

// =============================================================================
// Whole frames
// =============================================================================

fn bench_world_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_frame");
    group.sample_size(20);
    let count = 20_000;
    let params = Parameters::default();

    let mut workers = vec![1];
    if default_threads() > 1 {
        workers.push(default_threads());
    }

    for &p in &workers {
        let mut world = World::from_stars(galaxy(count), &params, p).unwrap();
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("workers", p), &p, |b, _| {
            b.iter(|| {
                world.world_frame(black_box(1.0 / 60.0)).unwrap();
            });
        });
        world.finalize_world().unwrap();
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_forces,
    bench_accuracy,
    bench_world_frame
);
criterion_main!(benches);
