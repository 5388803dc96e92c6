//! Single-writer occupancy mapper.
//!
//! [`OccupancyMapper`] owns the grid geometry, the evidence counters, the
//! resolver and the loop-closure controller. Every mutation takes
//! `&mut self`, so batch processing and resets can never interleave; share
//! it across threads through [`MapperWorker`](crate::threads::MapperWorker).
//!
//! ## Lifecycle
//!
//! ```text
//! configure ──► process / submit_batch ──► resolve*
//!     ▲                  │
//!     │                  ▼
//!     │        notify_loop_closure ──► replay(corrected keyframes)
//!     └── reconfigure (new geometry, counters reallocated and zeroed)
//! ```

mod reset;

pub use reset::{
    KeyframeSource, LoopClosureOutcome, LoopClosureStrategy, ResetController, replay,
};

use crate::core::{FrameTransform, KeyframePoints, MapPoint, Point3, PointBatch};
use crate::error::Result;
use crate::grid::{
    BatchStats, ClassifiedGrid, CostGrid, CounterPair, CountingMode, EvidenceAccumulator,
    GridSpec, ProbabilityGrid, ProbabilityResolver, ThresholdConfig, process_batch,
};

/// Runtime configuration of the mapper.
#[derive(Clone, Debug, PartialEq)]
pub struct MapperConfig {
    /// Grid geometry
    pub grid: GridSpec,
    /// Probability thresholds
    pub thresholds: ThresholdConfig,
    /// Local vs mirrored counting
    pub counting: CountingMode,
    /// Loop-closure strategy
    pub loop_closure: LoopClosureStrategy,
}

impl MapperConfig {
    /// Configuration with default thresholds, mirrored counting and hard reset.
    pub fn new(grid: GridSpec) -> Self {
        Self {
            grid,
            thresholds: ThresholdConfig::default(),
            counting: CountingMode::default(),
            loop_closure: LoopClosureStrategy::default(),
        }
    }

    /// Set thresholds
    pub fn with_thresholds(mut self, thresholds: ThresholdConfig) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set counting mode
    pub fn with_counting(mut self, counting: CountingMode) -> Self {
        self.counting = counting;
        self
    }

    /// Set loop-closure strategy
    pub fn with_loop_closure(mut self, strategy: LoopClosureStrategy) -> Self {
        self.loop_closure = strategy;
        self
    }
}

/// Running totals since the last (re)configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapperStats {
    /// Batches processed (replayed batches included)
    pub batches_processed: u64,
    /// Points that produced a hit
    pub points_integrated: u64,
    /// Points dropped out of bounds
    pub points_dropped: u64,
    /// Loop-closure signals received
    pub loop_closures: u64,
}

impl MapperStats {
    fn record(&mut self, batches: u64, stats: &BatchStats) {
        self.batches_processed += batches;
        self.points_integrated += stats.points_integrated as u64;
        self.points_dropped += stats.points_dropped as u64;
    }
}

/// The occupancy grid engine.
pub struct OccupancyMapper {
    spec: GridSpec,
    accumulator: EvidenceAccumulator,
    resolver: ProbabilityResolver,
    reset: ResetController,
    config: MapperConfig,
    stats: MapperStats,
}

impl OccupancyMapper {
    /// Build a mapper. Invalid thresholds are rejected before any counters
    /// are allocated.
    pub fn new(config: MapperConfig) -> Result<Self> {
        let resolver = ProbabilityResolver::new(config.thresholds.clone())?;
        let spec = config.grid.clone();
        let accumulator = EvidenceAccumulator::new(&spec, config.counting);

        log::info!(
            "Occupancy grid {}x{} cells, origin ({:.2}, {:.2}), counting={:?}, loop_closure={:?}",
            spec.width(),
            spec.height(),
            spec.origin().x,
            spec.origin().y,
            config.counting,
            config.loop_closure
        );

        Ok(Self {
            spec,
            accumulator,
            resolver,
            reset: ResetController::new(config.loop_closure),
            config,
            stats: MapperStats::default(),
        })
    }

    /// Replace the configuration, reallocating and zeroing all counters.
    ///
    /// On error the current state is left untouched.
    pub fn configure(&mut self, config: MapperConfig) -> Result<()> {
        *self = Self::new(config)?;
        Ok(())
    }

    /// Restore counters from a checkpoint taken by external code.
    pub fn restore_counters(&mut self, global: CounterPair, local: Option<CounterPair>) -> Result<()> {
        self.accumulator =
            EvidenceAccumulator::from_raw(&self.spec, self.config.counting, global, local)?;
        Ok(())
    }

    // === Accessors ===

    /// Grid geometry
    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Active configuration
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Read-only view of the counters
    pub fn accumulator(&self) -> &EvidenceAccumulator {
        &self.accumulator
    }

    /// Number of hard resets performed
    pub fn epoch(&self) -> u64 {
        self.reset.epoch()
    }

    /// Running totals
    pub fn stats(&self) -> MapperStats {
        self.stats
    }

    // === Updates ===

    /// Integrate one batch of navigation-frame points.
    pub fn process(&mut self, batch: &PointBatch) -> BatchStats {
        let stats = process_batch(&mut self.accumulator, &self.spec, batch);
        self.stats.record(1, &stats);
        stats
    }

    /// Filter points by observation count and integrate them.
    ///
    /// Points and observer must already be in the navigation frame.
    pub fn submit_batch(
        &mut self,
        points: &[MapPoint],
        observer: Point3,
        min_observations: u32,
    ) -> BatchStats {
        let keyframe = KeyframePoints::new(observer, points.to_vec());
        self.submit_keyframe(&keyframe, &FrameTransform::IDENTITY, min_observations)
    }

    /// Convert a backend keyframe payload and integrate it.
    pub fn submit_keyframe(
        &mut self,
        keyframe: &KeyframePoints,
        transform: &FrameTransform,
        min_observations: u32,
    ) -> BatchStats {
        let batch = keyframe.to_batch(transform, min_observations);
        self.process(&batch)
    }

    /// Handle a loop-closure signal according to the configured strategy.
    pub fn notify_loop_closure(&mut self) -> LoopClosureOutcome {
        self.stats.loop_closures += 1;
        self.reset.on_loop_closure(&mut self.accumulator)
    }

    /// Handle a loop-closure signal and rebuild from `source` immediately.
    pub fn handle_loop_closure_with<S>(&mut self, source: &mut S) -> LoopClosureOutcome
    where
        S: KeyframeSource + ?Sized,
    {
        self.stats.loop_closures += 1;
        let outcome = self
            .reset
            .recover_with(&mut self.accumulator, &self.spec, source);
        self.record_replay(&outcome);
        outcome
    }

    /// Finish a loop closure with a keyframe set fetched by the caller.
    ///
    /// Same outcome as [`handle_loop_closure_with`](Self::handle_loop_closure_with)
    /// without calling into the backend.
    pub fn complete_loop_closure(&mut self, fetched: Result<Vec<PointBatch>>) -> LoopClosureOutcome {
        self.stats.loop_closures += 1;
        let outcome = self
            .reset
            .recover_from(&mut self.accumulator, &self.spec, fetched);
        self.record_replay(&outcome);
        outcome
    }

    fn record_replay(&mut self, outcome: &LoopClosureOutcome) {
        if let LoopClosureOutcome::Replayed { stats, .. } = outcome {
            self.stats.record(0, stats);
        }
    }

    /// Rebuild the counters from scratch over `batches`.
    pub fn replay<'a, I>(&mut self, batches: I) -> BatchStats
    where
        I: IntoIterator<Item = &'a PointBatch>,
    {
        let mut count = 0u64;
        let stats = replay(
            &mut self.accumulator,
            &self.spec,
            batches.into_iter().inspect(|_| count += 1),
        );
        self.stats.record(count, &stats);
        stats
    }

    // === Queries ===

    /// Continuous occupancy probability grid.
    pub fn resolve(&self) -> Result<ProbabilityGrid> {
        self.resolver.resolve(&self.accumulator, &self.spec)
    }

    /// Free/occupied/unknown classification grid.
    pub fn resolve_classified(&self) -> Result<ClassifiedGrid> {
        self.resolver.resolve_classified(&self.accumulator, &self.spec)
    }

    /// Navigation cost grid (`-1` unknown, `0..=100` otherwise).
    pub fn resolve_cost(&self) -> Result<CostGrid> {
        self.resolver.resolve_cost(&self.accumulator, &self.spec)
    }
}
