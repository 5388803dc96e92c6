//! Benchmark grid engine operations.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::f32::consts::PI;

use chitra_grid::grid::ray_marker::RayMarker;
use chitra_grid::{
    Cell, CountingMode, GridSpec, MapperConfig, OccupancyMapper, Point3, PointBatch, WorldPoint,
};

/// Keyframe seeing `num_points` points on a circle of `radius` around `center`.
fn ring_batch(center: (f32, f32), radius: f32, num_points: usize) -> PointBatch {
    let points = (0..num_points)
        .map(|i| {
            let angle = i as f32 * 2.0 * PI / num_points as f32;
            Point3::new(
                center.0 + radius * angle.cos(),
                center.1 + radius * angle.sin(),
                0.3,
            )
        })
        .collect();
    PointBatch::new(Point3::new(center.0, center.1, 0.0), points)
}

/// 20x20 unit area at 10 cells per unit.
fn mapper(counting: CountingMode) -> OccupancyMapper {
    let grid = GridSpec::uniform(WorldPoint::new(-10.0, -10.0), WorldPoint::new(10.0, 10.0), 10.0)
        .unwrap();
    OccupancyMapper::new(MapperConfig::new(grid).with_counting(counting)).unwrap()
}

fn bench_ray_marker(c: &mut Criterion) {
    let from = Cell::new(3, 7);
    let to = Cell::new(180, 121);

    c.bench_function("ray_marker_180_cells", |b| {
        b.iter(|| {
            let n = RayMarker::new(black_box(from), black_box(to)).count();
            black_box(n)
        })
    });
}

fn bench_process_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_batch");

    for num_points in [100, 500, 2000].iter() {
        for counting in [CountingMode::Mirrored, CountingMode::Local] {
            let mut m = mapper(counting);
            let batch = ring_batch((0.0, 0.0), 6.0, *num_points);

            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", counting), num_points),
                num_points,
                |b, _| {
                    b.iter(|| {
                        let stats = m.process(black_box(&batch));
                        black_box(stats)
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut m = mapper(CountingMode::Mirrored);
    for i in 0..20 {
        let offset = i as f32 * 0.2;
        m.process(&ring_batch((offset, -offset), 6.0, 500));
    }

    c.bench_function("resolve_probability", |b| {
        b.iter(|| black_box(m.resolve().unwrap()))
    });

    c.bench_function("resolve_classified", |b| {
        b.iter(|| black_box(m.resolve_classified().unwrap()))
    });
}

fn bench_replay(c: &mut Criterion) {
    let mut m = mapper(CountingMode::Mirrored);
    let keyframes: Vec<PointBatch> = (0..50)
        .map(|i| ring_batch((i as f32 * 0.1, 0.0), 5.0, 200))
        .collect();

    c.bench_function("replay_50_keyframes", |b| {
        b.iter(|| black_box(m.replay(black_box(&keyframes))))
    });
}

criterion_group!(
    benches,
    bench_ray_marker,
    bench_process_batch,
    bench_resolve,
    bench_replay
);
criterion_main!(benches);
