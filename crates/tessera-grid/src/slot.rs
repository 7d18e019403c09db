//! One addressable unit of grid capacity and its occupancy state machine.

use tessera_core::{SlotCoord, SlotState, SlotTag, TimerId, TxId};

/// Everything an occupied slot holds.
///
/// Bundling the identifier, tag, and timer handle into one struct makes the
/// slot invariant structural: a slot is occupied exactly when all three are
/// present, and empty exactly when none are.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occupancy {
    /// The tracked transaction identifier.
    pub tx: TxId,
    /// Classification label for the renderer.
    pub tag: SlotTag,
    /// Handle of the expiry timer armed for this occupancy.
    pub timer: TimerId,
}

/// One slot in the grid.
///
/// Cycles between `Empty` and `Occupied` for the grid's lifetime; the
/// coordinate is fixed at creation.
#[derive(Clone, Debug)]
pub struct Slot {
    coord: SlotCoord,
    occupancy: Option<Occupancy>,
}

impl Slot {
    pub(crate) fn new(coord: SlotCoord) -> Self {
        Self {
            coord,
            occupancy: None,
        }
    }

    /// Fixed coordinate assigned at creation.
    pub fn coord(&self) -> SlotCoord {
        self.coord
    }

    /// Current state.
    pub fn state(&self) -> SlotState {
        if self.occupancy.is_some() {
            SlotState::Occupied
        } else {
            SlotState::Empty
        }
    }

    /// Whether the slot currently holds an identifier.
    pub fn is_occupied(&self) -> bool {
        self.occupancy.is_some()
    }

    /// The current occupancy, if any.
    pub fn occupancy(&self) -> Option<&Occupancy> {
        self.occupancy.as_ref()
    }

    /// Fill the slot. The caller guarantees it is empty.
    pub(crate) fn occupy(&mut self, occupancy: Occupancy) {
        debug_assert!(self.occupancy.is_none(), "occupy on a non-empty slot");
        self.occupancy = Some(occupancy);
    }

    /// Empty the slot, returning what it held. `None` if already empty.
    pub(crate) fn vacate(&mut self) -> Option<Occupancy> {
        self.occupancy.take()
    }
}
