//! The slot grid: allocation, freeing, capacity accounting, and reset.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use tessera_core::{AllocError, FreeCause, SlotCoord, SlotTag, TimerId, TxId};

use crate::error::GridError;
use crate::free_list::FreeList;
use crate::geometry::GridGeometry;
use crate::slot::{Occupancy, Slot};

/// Fixed 2-D collection of slots with a dynamically adjustable capacity
/// limit.
///
/// Slots are created with the grid and never destroyed individually; they
/// cycle between empty and occupied for the grid's lifetime. Placement is
/// a uniformly random draw over the currently-empty slots, seeded once at
/// construction so a given seed reproduces the same placement sequence.
///
/// The active count is derived from the free-list length, so it always
/// equals the number of occupied slots a full scan would find. The capacity
/// limit is recomputed from the stored percentage on every use rather than
/// cached.
#[derive(Debug)]
pub struct SlotGrid {
    geometry: GridGeometry,
    slots: Vec<Slot>,
    free: FreeList,
    capacity_percent: u8,
    rng: ChaCha8Rng,
}

impl SlotGrid {
    /// Create a grid with `rows * cols` empty slots.
    ///
    /// `capacity_percent` is clamped to 0–100. `seed` fixes the placement
    /// RNG stream.
    pub fn new(
        rows: u32,
        cols: u32,
        capacity_percent: u8,
        seed: u64,
    ) -> Result<Self, GridError> {
        let geometry = GridGeometry::new(rows, cols)?;
        let count = geometry.cell_count();
        let slots = (0..count).map(|i| Slot::new(geometry.coord_of(i))).collect();
        Ok(Self {
            geometry,
            slots,
            free: FreeList::with_all_free(count),
            capacity_percent: capacity_percent.min(100),
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// The grid's validated dimensions.
    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    /// Total number of slots, occupied or not.
    pub fn total_slots(&self) -> usize {
        self.slots.len()
    }

    /// Number of currently occupied slots.
    pub fn active_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// The stored capacity percentage (0–100).
    pub fn capacity_percent(&self) -> u8 {
        self.capacity_percent
    }

    /// The effective occupancy limit: `floor(percent/100 * total_slots)`.
    pub fn capacity_limit(&self) -> usize {
        self.capacity_percent as usize * self.slots.len() / 100
    }

    /// Change the capacity percentage (clamped to 0–100).
    ///
    /// Takes effect on subsequent allocations only. Lowering the limit
    /// below the active count never evicts existing occupants; allocations
    /// are simply rejected until occupancy drops back under the new limit.
    pub fn set_capacity_percent(&mut self, percent: u8) {
        self.capacity_percent = percent.min(100);
        debug!(
            percent = self.capacity_percent,
            limit = self.capacity_limit(),
            "capacity changed"
        );
    }

    /// The slot at `coord`, or `None` if out of bounds.
    pub fn slot(&self, coord: SlotCoord) -> Option<&Slot> {
        self.geometry.index_of(coord).map(|i| &self.slots[i])
    }

    /// All slots in row-major order.
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    /// The occupied slots, in unspecified order.
    pub fn occupied(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|s| s.is_occupied())
    }

    /// Place `tx` in a uniformly random empty slot.
    ///
    /// Rejects with [`AllocError::CapacityExhausted`] when the active count
    /// has reached the capacity limit, and with [`AllocError::GridSaturated`]
    /// if no physical slot is free. On success, `arm` is called with the
    /// chosen coordinate to start the expiry timer, and its handle is stored
    /// with the occupancy.
    ///
    /// Duplicate identifiers are not checked: the same `tx` submitted twice
    /// occupies two slots.
    pub fn allocate(
        &mut self,
        tx: TxId,
        tag: SlotTag,
        arm: impl FnOnce(SlotCoord) -> TimerId,
    ) -> Result<SlotCoord, AllocError> {
        let active = self.active_count();
        let limit = self.capacity_limit();
        if active >= limit {
            debug!(active, limit, "allocation rejected: capacity exhausted");
            return Err(AllocError::CapacityExhausted { active, limit });
        }
        let Some(index) = self.free.draw(&mut self.rng) else {
            debug!(active, "allocation rejected: grid saturated");
            return Err(AllocError::GridSaturated);
        };

        let coord = self.geometry.coord_of(index as usize);
        let timer = arm(coord);
        self.slots[index as usize].occupy(Occupancy { tx, tag, timer });
        trace!(%coord, %timer, "slot occupied");
        Ok(coord)
    }

    /// Empty the slot at `coord`, returning what it held.
    ///
    /// Idempotent: freeing an already-empty slot (or an out-of-bounds
    /// coordinate) returns `None` and changes nothing, which makes the race
    /// between an expiry firing and a reconciliation freeing the same slot
    /// harmless in either order.
    pub fn free(&mut self, coord: SlotCoord, cause: FreeCause) -> Option<Occupancy> {
        let index = self.geometry.index_of(coord)?;
        let vacated = self.slots[index].vacate()?;
        self.free.release(index as u32);
        trace!(%coord, %cause, "slot freed");
        Some(vacated)
    }

    /// Empty every occupied slot, returning the vacated occupancies.
    ///
    /// The caller cancels the returned timers and requests a full redraw.
    pub fn reset(&mut self) -> Vec<(SlotCoord, Occupancy)> {
        let mut vacated = Vec::with_capacity(self.active_count());
        for slot in &mut self.slots {
            if let Some(occupancy) = slot.vacate() {
                vacated.push((slot.coord(), occupancy));
            }
        }
        self.free.reset_all_free();
        debug!(cleared = vacated.len(), "grid reset");
        vacated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::SlotState;

    fn grid(rows: u32, cols: u32, percent: u8) -> SlotGrid {
        SlotGrid::new(rows, cols, percent, 42).unwrap()
    }

    fn fill(grid: &mut SlotGrid, n: usize) -> Vec<SlotCoord> {
        let mut next_timer = 0u64;
        (0..n)
            .map(|i| {
                grid.allocate(TxId::from(format!("0x{i:04x}")), SlotTag::pending(), |_| {
                    next_timer += 1;
                    TimerId(next_timer)
                })
                .unwrap()
            })
            .collect()
    }

    // ── allocation ──────────────────────────────────────────────

    #[test]
    fn allocate_respects_capacity_limit() {
        let mut g = grid(4, 5, 50); // 20 slots, limit 10
        assert_eq!(g.capacity_limit(), 10);
        fill(&mut g, 10);
        assert_eq!(g.active_count(), 10);

        let err = g
            .allocate(TxId::from("0xff"), SlotTag::pending(), |_| TimerId(99))
            .unwrap_err();
        assert_eq!(
            err,
            AllocError::CapacityExhausted {
                active: 10,
                limit: 10
            }
        );
        assert_eq!(g.active_count(), 10);
    }

    #[test]
    fn allocations_land_on_distinct_slots() {
        let mut g = grid(6, 6, 100);
        let coords = fill(&mut g, 36);
        let mut sorted = coords.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 36);
        assert_eq!(g.active_count(), 36);
    }

    #[test]
    fn full_grid_rejects_on_capacity_first() {
        let mut g = grid(3, 3, 100);
        fill(&mut g, 9);
        let err = g
            .allocate(TxId::from("0xff"), SlotTag::pending(), |_| TimerId(99))
            .unwrap_err();
        assert!(matches!(err, AllocError::CapacityExhausted { .. }));
    }

    #[test]
    fn zero_percent_rejects_everything() {
        let mut g = grid(4, 4, 0);
        let err = g
            .allocate(TxId::from("0x01"), SlotTag::pending(), |_| TimerId(1))
            .unwrap_err();
        assert_eq!(err, AllocError::CapacityExhausted { active: 0, limit: 0 });
    }

    #[test]
    fn rejected_allocation_does_not_arm_timer() {
        let mut g = grid(4, 4, 0);
        let mut armed = false;
        let _ = g.allocate(TxId::from("0x01"), SlotTag::pending(), |_| {
            armed = true;
            TimerId(1)
        });
        assert!(!armed);
    }

    #[test]
    fn same_seed_reproduces_placement() {
        let mut a = SlotGrid::new(8, 8, 100, 7).unwrap();
        let mut b = SlotGrid::new(8, 8, 100, 7).unwrap();
        let ca = fill(&mut a, 20);
        let cb = fill(&mut b, 20);
        assert_eq!(ca, cb);
    }

    #[test]
    fn duplicate_identifiers_occupy_two_slots() {
        let mut g = grid(4, 4, 100);
        let a = g
            .allocate(TxId::from("0xdup"), SlotTag::pending(), |_| TimerId(1))
            .unwrap();
        let b = g
            .allocate(TxId::from("0xdup"), SlotTag::pending(), |_| TimerId(2))
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(g.active_count(), 2);
    }

    // ── freeing ─────────────────────────────────────────────────

    #[test]
    fn free_returns_occupancy_and_is_idempotent() {
        let mut g = grid(4, 4, 100);
        let coord = fill(&mut g, 1)[0];

        let vacated = g.free(coord, FreeCause::Reconciled).unwrap();
        assert_eq!(vacated.timer, TimerId(1));
        assert_eq!(g.active_count(), 0);
        assert_eq!(g.slot(coord).unwrap().state(), SlotState::Empty);

        // Second free on the same slot: no-op, count unchanged.
        assert!(g.free(coord, FreeCause::Expired).is_none());
        assert_eq!(g.active_count(), 0);
    }

    #[test]
    fn free_out_of_bounds_is_noop() {
        let mut g = grid(4, 4, 100);
        assert!(g.free(SlotCoord::new(9, 9), FreeCause::Expired).is_none());
    }

    #[test]
    fn freed_slot_is_immediately_reallocatable() {
        let mut g = grid(1, 1, 100);
        let coord = fill(&mut g, 1)[0];
        g.free(coord, FreeCause::Expired);

        let again = g
            .allocate(TxId::from("0xnew"), SlotTag::pending(), |_| TimerId(2))
            .unwrap();
        assert_eq!(again, coord);
        assert_eq!(g.slot(coord).unwrap().occupancy().unwrap().timer, TimerId(2));
    }

    // ── capacity ────────────────────────────────────────────────

    #[test]
    fn lowering_capacity_never_evicts() {
        let mut g = grid(4, 5, 100); // 20 slots
        let coords = fill(&mut g, 15);
        g.set_capacity_percent(25); // limit 5, active 15
        assert_eq!(g.capacity_limit(), 5);
        assert_eq!(g.active_count(), 15, "occupants survive the lowering");
        for coord in &coords {
            assert!(g.slot(*coord).unwrap().is_occupied());
        }

        // Blocked until occupancy drops under the new limit.
        assert!(g
            .allocate(TxId::from("0xff"), SlotTag::pending(), |_| TimerId(99))
            .is_err());
        for coord in coords.iter().take(11) {
            g.free(*coord, FreeCause::Expired);
        }
        assert_eq!(g.active_count(), 4);
        assert!(g
            .allocate(TxId::from("0xok"), SlotTag::pending(), |_| TimerId(100))
            .is_ok());
    }

    #[test]
    fn capacity_percent_is_clamped() {
        let mut g = grid(4, 4, 200);
        assert_eq!(g.capacity_percent(), 100);
        g.set_capacity_percent(150);
        assert_eq!(g.capacity_percent(), 100);
        assert_eq!(g.capacity_limit(), 16);
    }

    #[test]
    fn capacity_limit_floors() {
        let g = grid(3, 3, 95); // floor(0.95 * 9) = 8
        assert_eq!(g.capacity_limit(), 8);
    }

    // ── reset ───────────────────────────────────────────────────

    #[test]
    fn reset_vacates_everything() {
        let mut g = grid(4, 4, 100);
        fill(&mut g, 12);
        let vacated = g.reset();
        assert_eq!(vacated.len(), 12);
        assert_eq!(g.active_count(), 0);
        assert!(g.slots().all(|s| !s.is_occupied()));

        // Grid is fully usable again.
        fill(&mut g, 16);
        assert_eq!(g.active_count(), 16);
    }

    // ── proptest ────────────────────────────────────────────────

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Clone, Debug)]
        enum Op {
            Allocate,
            Free(u32, u32),
            SetCapacity(u8),
        }

        fn arb_op() -> impl Strategy<Value = Op> {
            prop_oneof![
                3 => Just(Op::Allocate),
                2 => (0u32..8, 0u32..8).prop_map(|(r, c)| Op::Free(r, c)),
                1 => (0u8..=100).prop_map(Op::SetCapacity),
            ]
        }

        proptest! {
            #[test]
            fn active_count_always_matches_scan(ops in prop::collection::vec(arb_op(), 0..200)) {
                let mut g = SlotGrid::new(8, 8, 75, 11).unwrap();
                let mut next_timer = 0u64;
                let mut serial = 0u32;

                for op in ops {
                    match op {
                        Op::Allocate => {
                            serial += 1;
                            let before = g.active_count();
                            let outcome = g.allocate(
                                TxId::from(format!("0x{serial:06x}")),
                                SlotTag::pending(),
                                |_| {
                                    next_timer += 1;
                                    TimerId(next_timer)
                                },
                            );
                            if outcome.is_ok() {
                                prop_assert!(g.active_count() <= g.capacity_limit());
                                prop_assert_eq!(g.active_count(), before + 1);
                            } else {
                                prop_assert_eq!(g.active_count(), before);
                            }
                        }
                        Op::Free(r, c) => {
                            let coord = SlotCoord::new(r, c);
                            let was_occupied =
                                g.slot(coord).is_some_and(|s| s.is_occupied());
                            let freed = g.free(coord, FreeCause::Expired).is_some();
                            prop_assert_eq!(freed, was_occupied);
                        }
                        Op::SetCapacity(p) => g.set_capacity_percent(p),
                    }
                    prop_assert_eq!(g.active_count(), g.occupied().count());
                }
            }
        }
    }
}
