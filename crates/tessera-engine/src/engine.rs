//! The synchronous allocation/expiry/reconciliation engine.
//!
//! One explicit object owns the grid, the expiry scheduler, the metrics,
//! and the rendering sink; every public operation is a discrete,
//! non-preemptible callback. Time is passed in by the caller, so the
//! engine is fully deterministic under test.

use std::collections::HashSet;
use std::time::Instant;

use smallvec::SmallVec;
use tracing::{debug, info, trace};

use tessera_core::{
    AllocError, FreeCause, RenderSink, SlotCoord, SlotState, SlotTag, SlotUpdate, TxId,
    UpdateCause,
};
use tessera_grid::{GridError, SlotGrid};

use crate::config::{ConfigError, EngineConfig};
use crate::expiry::ExpiryScheduler;
use crate::metrics::EngineMetrics;

/// Slot allocation and reconciliation engine.
///
/// Lifecycle: construct with [`new`](Self::new), drive with the feed
/// operations, optionally [`reset`](Self::reset) or
/// [`recreate`](Self::recreate) any number of times, drop to shut down.
/// For the threaded variant see [`LiveEngine`](crate::LiveEngine).
pub struct Engine {
    grid: SlotGrid,
    scheduler: ExpiryScheduler,
    metrics: EngineMetrics,
    sink: Box<dyn RenderSink>,
    seed: u64,
}

impl Engine {
    /// Validate `config` and build an engine delivering updates to `sink`.
    pub fn new(config: &EngineConfig, sink: Box<dyn RenderSink>) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = SlotGrid::new(config.rows, config.cols, config.capacity_percent, config.seed)?;
        info!(
            rows = config.rows,
            cols = config.cols,
            limit = grid.capacity_limit(),
            ttl_secs = config.ttl.as_secs(),
            "engine created"
        );
        Ok(Self {
            grid,
            scheduler: ExpiryScheduler::new(config.ttl),
            metrics: EngineMetrics::default(),
            sink,
            seed: config.seed,
        })
    }

    /// Track a newly observed pending identifier.
    ///
    /// Places `tx` in a uniformly random empty slot, arms its TTL timer
    /// from `now`, and notifies the sink. Returns the chosen coordinate,
    /// or `None` when the allocation was rejected — the identifier is
    /// dropped, which is the expected outcome under load. Duplicates are
    /// not checked; the same identifier may occupy several slots.
    pub fn submit_pending(&mut self, tx: TxId, tag: SlotTag, now: Instant) -> Option<SlotCoord> {
        let update_tag = tag.clone();
        let scheduler = &mut self.scheduler;
        match self
            .grid
            .allocate(tx, tag, |coord| scheduler.schedule(coord, now))
        {
            Ok(coord) => {
                self.metrics.allocated += 1;
                self.sink.slot_changed(&SlotUpdate {
                    coord,
                    state: SlotState::Occupied,
                    tag: update_tag,
                    cause: UpdateCause::Allocated,
                });
                Some(coord)
            }
            Err(AllocError::CapacityExhausted { .. }) => {
                self.metrics.capacity_rejections += 1;
                None
            }
            Err(AllocError::GridSaturated) => {
                self.metrics.saturation_rejections += 1;
                None
            }
        }
    }

    /// Free every occupied slot whose identifier appears in `finalized`.
    ///
    /// Returns the number of slots freed. An empty batch short-circuits
    /// without scanning the grid. Matching is exact string identity; a
    /// single match frees every slot holding that identifier (duplicates
    /// resolve together).
    pub fn reconcile(&mut self, finalized: &[TxId]) -> usize {
        if finalized.is_empty() {
            self.metrics.empty_batches += 1;
            trace!("empty finalized batch skipped");
            return 0;
        }

        let wanted: HashSet<&TxId> = finalized.iter().collect();
        let matches: SmallVec<[SlotCoord; 8]> = self
            .grid
            .occupied()
            .filter_map(|slot| {
                let occupancy = slot.occupancy()?;
                wanted.contains(&occupancy.tx).then(|| slot.coord())
            })
            .collect();

        let mut freed = 0;
        for coord in matches {
            if self.free_slot(coord, FreeCause::Reconciled) {
                freed += 1;
            }
        }
        self.metrics.reconciled += freed as u64;
        debug!(batch = finalized.len(), freed, "finalized batch reconciled");
        freed
    }

    /// Fire every expiry whose deadline has passed.
    ///
    /// Returns the number of slots freed. A fired timer frees its slot
    /// only if the slot still holds that exact handle; anything else is a
    /// stale fire from a lost race and is discarded.
    pub fn poll_expired(&mut self, now: Instant) -> usize {
        let mut freed = 0;
        for expired in self.scheduler.due(now) {
            let holds = self
                .grid
                .slot(expired.coord)
                .and_then(|slot| slot.occupancy())
                .is_some_and(|occupancy| occupancy.timer == expired.timer);
            if !holds {
                self.metrics.stale_timer_fires += 1;
                continue;
            }
            if self.free_slot(expired.coord, FreeCause::Expired) {
                freed += 1;
            }
        }
        self.metrics.expired += freed as u64;
        freed
    }

    /// Change the capacity percentage. Applies to future allocations only.
    pub fn set_capacity_percent(&mut self, percent: u8) {
        self.grid.set_capacity_percent(percent);
    }

    /// Free every slot, cancel all timers, and request a full redraw.
    pub fn reset(&mut self) {
        let cleared = self.grid.reset().len();
        self.scheduler.clear();
        self.metrics.resets += 1;
        self.sink.grid_cleared();
        info!(cleared, "engine reset");
    }

    /// Rebuild the grid with new dimensions, discarding all occupancy.
    ///
    /// Keeps the capacity percentage and restarts the placement RNG from
    /// the configured seed. On a validation error the existing grid is
    /// left untouched.
    pub fn recreate(&mut self, rows: u32, cols: u32) -> Result<(), GridError> {
        let grid = SlotGrid::new(rows, cols, self.grid.capacity_percent(), self.seed)?;
        self.grid = grid;
        self.scheduler.clear();
        self.sink.grid_cleared();
        info!(rows, cols, "grid recreated");
        Ok(())
    }

    /// Earliest pending expiry deadline, for bounding dispatch sleeps.
    pub fn next_deadline(&mut self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Read access to the grid.
    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    /// Cumulative counters.
    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// Shared free path: vacate the slot, cancel its timer, notify the
    /// sink. Returns whether a transition happened.
    fn free_slot(&mut self, coord: SlotCoord, cause: FreeCause) -> bool {
        match self.grid.free(coord, cause) {
            Some(occupancy) => {
                // No-op if the timer already fired; handles are never reused.
                self.scheduler.cancel(occupancy.timer);
                self.sink.slot_changed(&SlotUpdate {
                    coord,
                    state: SlotState::Empty,
                    tag: occupancy.tag,
                    cause: cause.into(),
                });
                true
            }
            None => {
                self.metrics.duplicate_frees += 1;
                false
            }
        }
    }
}
