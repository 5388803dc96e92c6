//! Loop-closure handling.
//!
//! A loop closure means past keyframe poses have moved, so every counter
//! integrated under the old poses is suspect. Two strategies:
//!
//! | Strategy | Behaviour |
//! |----------|-----------|
//! | [`LoopClosureStrategy::HardReset`] | Zero all counters, start a new epoch, rebuild by replay |
//! | [`LoopClosureStrategy::Ignore`] | Keep accumulating (accept drift) |
//!
//! Replay is nothing more than `reset_all` followed by ordinary
//! [`process_batch`] calls over the corrected keyframe set.

use serde::{Deserialize, Serialize};

use crate::core::PointBatch;
use crate::error::Result;
use crate::grid::{BatchStats, EvidenceAccumulator, GridSpec, process_batch};

/// What to do when the backend reports a pose correction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopClosureStrategy {
    /// Discard all evidence and rebuild from a keyframe replay.
    #[default]
    HardReset,
    /// Ignore the event.
    Ignore,
}

/// Supplier of the full, currently valid keyframe set.
///
/// Implemented by whatever bridges to the mapping backend. Failures should
/// be reported as [`MapError::Replay`](crate::MapError::Replay).
pub trait KeyframeSource {
    /// All keyframes with their points under the corrected poses.
    fn all_keyframes(&mut self) -> Result<Vec<PointBatch>>;
}

impl<F> KeyframeSource for F
where
    F: FnMut() -> Result<Vec<PointBatch>>,
{
    fn all_keyframes(&mut self) -> Result<Vec<PointBatch>> {
        self()
    }
}

/// Result of handling a loop closure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopClosureOutcome {
    /// Counters zeroed; the caller is expected to replay.
    Reset {
        /// Epoch after the reset
        epoch: u64,
    },
    /// Counters zeroed and rebuilt from the keyframe source.
    Replayed {
        /// Epoch after the reset
        epoch: u64,
        /// Totals over all replayed batches
        stats: BatchStats,
    },
    /// Keyframe source failed; the pre-reset counters were kept.
    Retained,
    /// Strategy is [`LoopClosureStrategy::Ignore`].
    Ignored,
}

/// Applies the loop-closure strategy to the accumulator and tracks epochs.
#[derive(Clone, Debug, Default)]
pub struct ResetController {
    strategy: LoopClosureStrategy,
    epoch: u64,
}

impl ResetController {
    /// Create a controller at epoch 0.
    pub fn new(strategy: LoopClosureStrategy) -> Self {
        Self { strategy, epoch: 0 }
    }

    /// Active strategy.
    pub fn strategy(&self) -> LoopClosureStrategy {
        self.strategy
    }

    /// Number of hard resets performed.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Handle a loop-closure signal without a keyframe source.
    pub fn on_loop_closure(&mut self, acc: &mut EvidenceAccumulator) -> LoopClosureOutcome {
        match self.strategy {
            LoopClosureStrategy::Ignore => {
                log::info!("Loop closure ignored (strategy=ignore)");
                LoopClosureOutcome::Ignored
            }
            LoopClosureStrategy::HardReset => LoopClosureOutcome::Reset {
                epoch: self.hard_reset(acc),
            },
        }
    }

    fn hard_reset(&mut self, acc: &mut EvidenceAccumulator) -> u64 {
        acc.reset_all();
        self.epoch += 1;
        log::info!("Loop closure: counters reset, epoch {}", self.epoch);
        self.epoch
    }

    /// Handle a loop-closure signal and rebuild from `source`.
    ///
    /// The keyframe set is fetched before anything is reset, so a failing
    /// source leaves the current counters untouched.
    pub fn recover_with<S>(
        &mut self,
        acc: &mut EvidenceAccumulator,
        spec: &GridSpec,
        source: &mut S,
    ) -> LoopClosureOutcome
    where
        S: KeyframeSource + ?Sized,
    {
        if self.strategy == LoopClosureStrategy::Ignore {
            return self.on_loop_closure(acc);
        }
        self.recover_from(acc, spec, source.all_keyframes())
    }

    /// Apply an already fetched keyframe set.
    ///
    /// Lets callers query the backend without holding any lock on the
    /// accumulator.
    pub fn recover_from(
        &mut self,
        acc: &mut EvidenceAccumulator,
        spec: &GridSpec,
        fetched: Result<Vec<PointBatch>>,
    ) -> LoopClosureOutcome {
        if self.strategy == LoopClosureStrategy::Ignore {
            return self.on_loop_closure(acc);
        }

        let batches = match fetched {
            Ok(batches) => batches,
            Err(e) => {
                log::warn!("Loop closure replay unavailable, keeping current grid: {}", e);
                return LoopClosureOutcome::Retained;
            }
        };

        let epoch = self.hard_reset(acc);
        let stats = replay(acc, spec, &batches);

        LoopClosureOutcome::Replayed { epoch, stats }
    }
}

/// Rebuild counters from scratch: `reset_all`, then process every batch.
pub fn replay<'a, I>(acc: &mut EvidenceAccumulator, spec: &GridSpec, batches: I) -> BatchStats
where
    I: IntoIterator<Item = &'a PointBatch>,
{
    acc.reset_all();

    let mut total = BatchStats::default();
    let mut count = 0usize;
    for batch in batches {
        total.merge(&process_batch(acc, spec, batch));
        count += 1;
    }

    log::info!(
        "Replayed {} keyframes: {} points integrated, {} dropped",
        count,
        total.points_integrated,
        total.points_dropped
    );
    total
}
