//! Error types shared across the Tessera workspace.
//!
//! Allocation failure is the only condition ever surfaced across the core
//! boundary; everything else in the engine is absorbed as a local no-op
//! plus a diagnostic event.

use std::error::Error;
use std::fmt;

/// Why an allocation request was rejected.
///
/// Neither variant is fatal. The caller is expected to drop the identifier;
/// the feed may offer it again later if the transaction is still pending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The active count has reached the capacity limit. Expected under
    /// load; recovered by dropping the identifier.
    CapacityExhausted {
        /// Occupied slots at the time of the request.
        active: usize,
        /// The effective capacity limit.
        limit: usize,
    },
    /// Every physical slot is occupied even though the capacity check
    /// passed. Reachable only with a capacity limit at the physical grid
    /// size; reported as a rejection, never a panic or an unbounded search.
    GridSaturated,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExhausted { active, limit } => {
                write!(f, "capacity exhausted: {active} active of {limit} allowed")
            }
            Self::GridSaturated => write!(f, "grid physically saturated"),
        }
    }
}

impl Error for AllocError {}
