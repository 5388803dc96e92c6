//! Mapper worker: single writer thread behind an ordered event queue.
//!
//! Producers enqueue batches and loop-closure signals from any thread. The
//! worker takes the write lock once per event; readers resolve grids
//! concurrently through the read lock.
//!
//! Every batch is stamped with the worker's epoch at submission time. A
//! hard-reset loop closure bumps the epoch *before* its event is queued, so
//! batches integrated under the old poses are discarded when dequeued
//! instead of landing in the freshly reset grid.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use parking_lot::{Mutex, RwLock};

use crate::core::PointBatch;
use crate::error::{MapError, Result};
use crate::grid::{ClassifiedGrid, CostGrid, ProbabilityGrid};
use crate::mapper::{KeyframeSource, LoopClosureStrategy, MapperConfig, OccupancyMapper};

/// Shared handle to the mapper.
pub type SharedMapper = Arc<RwLock<OccupancyMapper>>;

/// Events drained by the worker thread, in submission order.
enum MapperEvent {
    Batch { epoch: u64, batch: PointBatch },
    LoopClosure,
    Recover(Box<dyn KeyframeSource + Send>),
    Replay(Vec<PointBatch>),
    Configure(MapperConfig),
    Flush(Sender<()>),
    Shutdown,
}

/// Sending side of the queue.
///
/// Stamping, epoch bumps and sends happen under one lock so queue order and
/// epoch order agree. The strategy is tracked here, in queue order, so
/// producers never touch the mapper lock.
struct Producer {
    tx: Sender<MapperEvent>,
    strategy: LoopClosureStrategy,
}

impl Producer {
    fn send(&self, event: MapperEvent) -> Result<()> {
        self.tx.send(event).map_err(|_| MapError::WorkerStopped)
    }
}

/// Background thread owning all mapper mutations.
pub struct MapperWorker {
    mapper: SharedMapper,
    producer: Mutex<Producer>,
    epoch: Arc<AtomicU64>,
    discarded: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl MapperWorker {
    /// Spawn the worker thread around `mapper`.
    pub fn spawn(mapper: OccupancyMapper) -> std::io::Result<Self> {
        let strategy = mapper.config().loop_closure;
        let mapper: SharedMapper = Arc::new(RwLock::new(mapper));
        let epoch = Arc::new(AtomicU64::new(0));
        let discarded = Arc::new(AtomicU64::new(0));
        let (tx, rx) = unbounded();

        let handle = {
            let mapper = Arc::clone(&mapper);
            let epoch = Arc::clone(&epoch);
            let discarded = Arc::clone(&discarded);
            thread::Builder::new()
                .name("grid-mapper".into())
                .spawn(move || run_mapper_loop(mapper, rx, epoch, discarded))?
        };

        Ok(Self {
            mapper,
            producer: Mutex::new(Producer { tx, strategy }),
            epoch,
            discarded,
            handle: Some(handle),
        })
    }

    /// Shared handle for direct read access.
    pub fn mapper(&self) -> SharedMapper {
        Arc::clone(&self.mapper)
    }

    /// Current submission epoch.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Batches discarded as stale so far.
    pub fn discarded_batches(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    /// Queue a batch for integration.
    pub fn submit_batch(&self, batch: PointBatch) -> Result<()> {
        let producer = self.producer.lock();
        let epoch = self.epoch.load(Ordering::Acquire);
        producer.send(MapperEvent::Batch { epoch, batch })
    }

    /// Signal a loop closure.
    ///
    /// Under [`LoopClosureStrategy::HardReset`] every batch still queued is
    /// discarded.
    pub fn notify_loop_closure(&self) -> Result<()> {
        let producer = self.producer.lock();
        self.bump_epoch_if_resetting(&producer);
        producer.send(MapperEvent::LoopClosure)
    }

    /// Signal a loop closure and rebuild from `source` on the worker thread.
    pub fn handle_loop_closure_with<S>(&self, source: S) -> Result<()>
    where
        S: KeyframeSource + Send + 'static,
    {
        let producer = self.producer.lock();
        self.bump_epoch_if_resetting(&producer);
        producer.send(MapperEvent::Recover(Box::new(source)))
    }

    /// Queue a full rebuild over `batches`.
    pub fn replay(&self, batches: Vec<PointBatch>) -> Result<()> {
        self.producer.lock().send(MapperEvent::Replay(batches))
    }

    /// Queue a reconfiguration. Batches queued before it are discarded.
    ///
    /// Thresholds are validated here so a bad configuration is rejected
    /// synchronously.
    pub fn configure(&self, config: MapperConfig) -> Result<()> {
        config.thresholds.validate()?;
        let mut producer = self.producer.lock();
        self.epoch.fetch_add(1, Ordering::AcqRel);
        producer.strategy = config.loop_closure;
        producer.send(MapperEvent::Configure(config))
    }

    /// Block until every event queued so far has been applied.
    pub fn flush(&self) -> Result<()> {
        let (ack_tx, ack_rx) = bounded(1);
        self.producer.lock().send(MapperEvent::Flush(ack_tx))?;
        ack_rx.recv().map_err(|_| MapError::WorkerStopped)
    }

    // === Queries (read lock) ===

    /// Continuous occupancy probability grid.
    pub fn resolve(&self) -> Result<ProbabilityGrid> {
        self.mapper.read().resolve()
    }

    /// Free/occupied/unknown classification grid.
    pub fn resolve_classified(&self) -> Result<ClassifiedGrid> {
        self.mapper.read().resolve_classified()
    }

    /// Navigation cost grid.
    pub fn resolve_cost(&self) -> Result<CostGrid> {
        self.mapper.read().resolve_cost()
    }

    /// Stop the worker after draining queued events and wait for it.
    pub fn shutdown(mut self) -> thread::Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> thread::Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        // Worker may already be gone; joining reports that.
        let _ = self.producer.lock().send(MapperEvent::Shutdown);
        handle.join()
    }

    fn bump_epoch_if_resetting(&self, producer: &Producer) {
        if producer.strategy == LoopClosureStrategy::HardReset {
            self.epoch.fetch_add(1, Ordering::AcqRel);
        }
    }
}

impl Drop for MapperWorker {
    fn drop(&mut self) {
        if self.stop().is_err() {
            log::warn!("Mapper worker panicked");
        }
    }
}

/// Main worker loop.
fn run_mapper_loop(
    mapper: SharedMapper,
    rx: Receiver<MapperEvent>,
    epoch: Arc<AtomicU64>,
    discarded: Arc<AtomicU64>,
) {
    log::info!("Mapper worker starting");

    while let Ok(event) = rx.recv() {
        match event {
            MapperEvent::Batch {
                epoch: stamped,
                batch,
            } => {
                let current = epoch.load(Ordering::Acquire);
                if stamped < current {
                    discarded.fetch_add(1, Ordering::Relaxed);
                    log::debug!(
                        "Discarding stale batch of {} points (epoch {} < {})",
                        batch.len(),
                        stamped,
                        current
                    );
                    continue;
                }
                mapper.write().process(&batch);
            }
            MapperEvent::LoopClosure => {
                mapper.write().notify_loop_closure();
            }
            MapperEvent::Recover(mut source) => {
                // Backend fetch runs unlocked so resolves stay responsive
                let strategy = mapper.read().config().loop_closure;
                if strategy == LoopClosureStrategy::Ignore {
                    mapper.write().notify_loop_closure();
                    continue;
                }
                let fetched = source.all_keyframes();
                mapper.write().complete_loop_closure(fetched);
            }
            MapperEvent::Replay(batches) => {
                mapper.write().replay(&batches);
            }
            MapperEvent::Configure(config) => {
                if let Err(e) = mapper.write().configure(config) {
                    log::warn!("Reconfiguration rejected: {}", e);
                }
            }
            MapperEvent::Flush(ack) => {
                let _ = ack.send(());
            }
            MapperEvent::Shutdown => break,
        }
    }

    log::info!("Mapper worker stopped");
}
