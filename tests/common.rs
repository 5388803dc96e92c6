//! Test utilities for grid engine integration tests.
//!
//! Helpers for building grids, mappers, and synthetic keyframe batches.

#![allow(dead_code)]

use chitra_grid::{
    CountingMode, GridSpec, LoopClosureStrategy, MapperConfig, OccupancyMapper, Point3,
    PointBatch, WorldPoint,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 10x10 grid, one unit per cell, origin at (0, 0).
pub fn unit_grid() -> GridSpec {
    GridSpec::with_dimensions(WorldPoint::ZERO, 10, 10, 1.0).unwrap()
}

/// Mapper over `grid` with default thresholds.
pub fn mapper(grid: GridSpec, counting: CountingMode, strategy: LoopClosureStrategy) -> OccupancyMapper {
    let config = MapperConfig::new(grid)
        .with_counting(counting)
        .with_loop_closure(strategy);
    OccupancyMapper::new(config).unwrap()
}

/// Mapper over the unit grid with default settings.
pub fn unit_mapper() -> OccupancyMapper {
    mapper(unit_grid(), CountingMode::Mirrored, LoopClosureStrategy::HardReset)
}

/// Batch with a single point.
pub fn single_point(observer: (f32, f32), point: (f32, f32)) -> PointBatch {
    PointBatch::new(
        Point3::new(observer.0, observer.1, 0.0),
        vec![Point3::new(point.0, point.1, 0.0)],
    )
}

/// Points on the walls of a square room of side `size` centered at `center`.
pub fn room_batch(center: (f32, f32), size: f32, points_per_wall: usize) -> PointBatch {
    let half = size / 2.0;
    let (cx, cy) = center;
    let mut points = Vec::with_capacity(points_per_wall * 4);
    for i in 0..points_per_wall {
        let t = -half + size * i as f32 / points_per_wall as f32;
        points.push(Point3::new(cx + t, cy - half, 0.2));
        points.push(Point3::new(cx + half, cy + t, 0.2));
        points.push(Point3::new(cx - t, cy + half, 0.2));
        points.push(Point3::new(cx - half, cy - t, 0.2));
    }
    PointBatch::new(Point3::new(cx, cy, 0.0), points)
}

/// Random batches inside `[0, extent)` (some points deliberately outside).
pub fn random_batches(seed: u64, count: usize, points: usize, extent: f32) -> Vec<PointBatch> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let observer = Point3::new(
                rng.random_range(0.0..extent),
                rng.random_range(0.0..extent),
                0.0,
            );
            let pts = (0..points)
                .map(|_| {
                    Point3::new(
                        rng.random_range(-0.1 * extent..1.1 * extent),
                        rng.random_range(-0.1 * extent..1.1 * extent),
                        rng.random_range(-1.0..1.0),
                    )
                })
                .collect();
            PointBatch::new(observer, pts)
        })
        .collect()
}
