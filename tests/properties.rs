//! Invariants that must hold for arbitrary input streams.

mod common;

use chitra_grid::grid::CounterPair;
use chitra_grid::{
    Cell, CountingMode, EvidenceAccumulator, LoopClosureStrategy, MapError, MapperConfig,
    OccupancyMapper, Point3, PointBatch, ThresholdConfig,
};
use common::{mapper, random_batches, unit_grid};

const SEED: u64 = 0x5EED;

#[test]
fn counters_are_monotonic_between_resets() {
    for mode in [CountingMode::Mirrored, CountingMode::Local] {
        let mut m = mapper(unit_grid(), mode, LoopClosureStrategy::HardReset);
        let mut previous = m.accumulator().global().clone();

        for batch in random_batches(SEED, 40, 25, 10.0) {
            m.process(&batch);
            let current = m.accumulator().global();

            for i in 0..current.len() {
                assert!(current.occupied()[i] >= previous.occupied()[i], "{:?} cell {}", mode, i);
                assert!(current.visited()[i] >= previous.visited()[i], "{:?} cell {}", mode, i);
            }
            previous = current.clone();
        }
    }
}

#[test]
fn reset_all_is_idempotent() {
    let spec = unit_grid();
    let mut acc = EvidenceAccumulator::new(&spec, CountingMode::Local);
    for batch in random_batches(SEED, 5, 20, 10.0) {
        chitra_grid::grid::process_batch(&mut acc, &spec, &batch);
    }

    acc.reset_all();
    let once = acc.clone();
    acc.reset_all();

    assert!(acc.is_zero());
    assert_eq!(acc.global(), once.global());
    assert_eq!(acc.local(), once.local());
}

#[test]
fn repeated_ray_counts_local_visit_once() {
    for mode in [CountingMode::Mirrored, CountingMode::Local] {
        let mut m = mapper(unit_grid(), mode, LoopClosureStrategy::HardReset);
        let point = Point3::new(6.0, 3.0, 0.0);
        let batch = PointBatch::new(Point3::new(1.0, 1.0, 0.0), vec![point, point, point]);

        m.process(&batch);

        let acc = m.accumulator();
        let expected_global = match mode {
            CountingMode::Mirrored => 1,
            CountingMode::Local => 3,
        };
        // Every traversed cell, start cell included
        for cell in chitra_grid::grid::ray_marker::trace(Cell::new(1, 1), Cell::new(3, 6)) {
            let ev = acc.cell(cell).unwrap();
            assert_eq!(ev.local_visited, 1, "{:?} {:?}", mode, cell);
            assert_eq!(ev.global_visited, expected_global, "{:?} {:?}", mode, cell);
        }

        // Hits are not deduplicated
        let hit = acc.cell(Cell::new(3, 6)).unwrap();
        assert_eq!(hit.global_occupied, 3, "{:?}", mode);
        assert_eq!(hit.local_visited, 3, "{:?}", mode);
    }
}

#[test]
fn occupied_never_exceeds_visited() {
    for mode in [CountingMode::Mirrored, CountingMode::Local] {
        let mut m = mapper(unit_grid(), mode, LoopClosureStrategy::HardReset);
        for batch in random_batches(SEED + 2, 20, 30, 10.0) {
            m.process(&batch);
            let acc = m.accumulator();
            for pair in [acc.global(), acc.local()] {
                for (o, v) in pair.occupied().iter().zip(pair.visited()) {
                    assert!(o <= v, "{:?}", mode);
                }
            }
        }
    }
}

#[test]
fn probabilities_stay_in_unit_interval() {
    for mode in [CountingMode::Mirrored, CountingMode::Local] {
        let mut m = mapper(unit_grid(), mode, LoopClosureStrategy::HardReset);
        for batch in random_batches(SEED + 1, 30, 40, 10.0) {
            m.process(&batch);
            let grid = m.resolve().unwrap();
            assert!(grid.cells.iter().all(|p| (0.0..=1.0).contains(p)), "{:?}", mode);
        }

        let cost = m.resolve_cost().unwrap();
        assert!(cost.cells.iter().all(|&c| c == -1 || (0..=100).contains(&c)));
    }
}

#[test]
fn unvisited_cells_resolve_to_unknown_value() {
    let thresholds = ThresholdConfig {
        unknown_value: 0.3,
        ..Default::default()
    };
    let config = MapperConfig::new(unit_grid()).with_thresholds(thresholds);
    let mut m = OccupancyMapper::new(config).unwrap();
    m.process(&common::single_point((0.0, 0.0), (5.0, 0.0)));

    let grid = m.resolve().unwrap();
    for (cell, &p) in grid.iter() {
        let ev = m.accumulator().cell(cell).unwrap();
        if ev.global_visited == 0 {
            assert_eq!(p, 0.3, "cell {:?}", cell);
        } else {
            assert_ne!(p, 0.3, "cell {:?}", cell);
        }
    }
}

#[test]
fn visit_threshold_keeps_sparse_cells_unknown() {
    let thresholds = ThresholdConfig {
        visit_threshold: 1,
        ..Default::default()
    };
    let config = MapperConfig::new(unit_grid()).with_thresholds(thresholds);
    let mut m = OccupancyMapper::new(config).unwrap();

    m.process(&common::single_point((0.0, 0.0), (5.0, 0.0)));
    assert_eq!(*m.resolve_cost().unwrap().get(Cell::new(0, 5)).unwrap(), -1);

    m.process(&common::single_point((0.0, 0.0), (5.0, 0.0)));
    assert_eq!(*m.resolve_cost().unwrap().get(Cell::new(0, 5)).unwrap(), 100);
}

#[test]
fn occupied_without_visit_is_rejected() {
    let mut occupied = vec![0; 100];
    occupied[42] = 3;
    let visited = vec![0; 100];

    let err = CounterPair::from_vecs(occupied, visited, 10).unwrap_err();

    assert_eq!(
        err,
        MapError::CounterInvariant {
            row: 4,
            col: 2,
            occupied: 3
        }
    );
}

#[test]
fn invalid_unknown_value_rejected() {
    for unknown_value in [0.0, 1.0, f32::NAN] {
        let config = MapperConfig::new(unit_grid()).with_thresholds(ThresholdConfig {
            unknown_value,
            ..Default::default()
        });
        assert!(matches!(
            OccupancyMapper::new(config),
            Err(MapError::InvalidConfiguration(_))
        ));
    }
}
