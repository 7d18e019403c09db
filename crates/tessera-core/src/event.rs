//! Slot state, free causes, and the update payload delivered to the
//! rendering sink.

use std::fmt;

use crate::id::SlotCoord;

/// Classification label attached to an occupancy.
///
/// Used only by the rendering collaborator (e.g. to pick a color); the
/// engine stores and forwards it without interpretation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SlotTag(String);

impl SlotTag {
    /// Construct a tag from any string-like value.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The conventional tag for a newly observed pending transaction.
    pub fn pending() -> Self {
        Self::new("pending")
    }

    /// The tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SlotTag {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SlotTag {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Whether a slot currently holds an identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotState {
    /// No identifier; eligible for allocation.
    Empty,
    /// Holds an identifier and an armed expiry timer.
    Occupied,
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Occupied => write!(f, "occupied"),
        }
    }
}

/// Why an occupied slot transitioned back to empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FreeCause {
    /// The TTL elapsed without the identifier being finalized.
    Expired,
    /// The identifier appeared in a finalized batch.
    Reconciled,
    /// The whole grid was reset or recreated.
    Cleared,
}

impl fmt::Display for FreeCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "expired"),
            Self::Reconciled => write!(f, "reconciled"),
            Self::Cleared => write!(f, "cleared"),
        }
    }
}

/// What triggered a slot update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpdateCause {
    /// A pending identifier was placed in the slot.
    Allocated,
    /// The slot's TTL elapsed.
    Expired,
    /// The slot's identifier was found in a finalized batch.
    Reconciled,
    /// The grid was reset or recreated.
    Cleared,
}

impl From<FreeCause> for UpdateCause {
    fn from(cause: FreeCause) -> Self {
        match cause {
            FreeCause::Expired => Self::Expired,
            FreeCause::Reconciled => Self::Reconciled,
            FreeCause::Cleared => Self::Cleared,
        }
    }
}

impl fmt::Display for UpdateCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocated => write!(f, "allocated"),
            Self::Expired => write!(f, "expired"),
            Self::Reconciled => write!(f, "reconciled"),
            Self::Cleared => write!(f, "cleared"),
        }
    }
}

/// One slot state transition, delivered to the rendering sink.
///
/// Emitted after every state-changing operation so the renderer can redraw
/// exactly the affected slot. The engine never emits updates on a timer of
/// its own beyond what a state transition triggers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotUpdate {
    /// Which slot changed.
    pub coord: SlotCoord,
    /// The state after the transition.
    pub state: SlotState,
    /// The tag carried by the occupancy (the new tag on allocation, the
    /// vacated occupancy's tag on a free).
    pub tag: SlotTag,
    /// What triggered the transition.
    pub cause: UpdateCause,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_cause_maps_into_update_cause() {
        assert_eq!(UpdateCause::from(FreeCause::Expired), UpdateCause::Expired);
        assert_eq!(
            UpdateCause::from(FreeCause::Reconciled),
            UpdateCause::Reconciled
        );
        assert_eq!(UpdateCause::from(FreeCause::Cleared), UpdateCause::Cleared);
    }

    #[test]
    fn pending_tag() {
        assert_eq!(SlotTag::pending().as_str(), "pending");
    }
}
