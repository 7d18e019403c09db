//! Strongly-typed identifiers for slots, transactions, and expiry timers.

use std::fmt;

/// Fixed (row, column) identity of a slot within the grid.
///
/// Assigned at grid creation and never changed afterwards. Row and column
/// are zero-based; the grid's geometry defines the valid ranges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotCoord {
    /// Zero-based row index.
    pub row: u32,
    /// Zero-based column index.
    pub col: u32,
}

impl SlotCoord {
    /// Construct a coordinate from row and column indices.
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for SlotCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Opaque transaction identifier.
///
/// The engine attaches no semantics to the contents: it is stored on
/// allocation and compared by exact string identity during reconciliation.
/// No normalization, no prefix handling, no case folding.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxId(String);

impl TxId {
    /// Construct an identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TxId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TxId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Handle for one scheduled expiry action.
///
/// Allocated from a monotonic counter by the scheduler. Each occupancy of a
/// slot gets a fresh handle; handles are never reused, so a stale handle
/// from a previous occupancy can never cancel or fire against the current
/// one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TimerId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
