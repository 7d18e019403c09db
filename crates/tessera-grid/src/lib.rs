//! Slot grid for the Tessera transaction visualizer.
//!
//! Defines the fixed 2-D collection of slots, the occupancy state machine,
//! and the O(1) uniform free-slot sampler that replaces rejection-sampling
//! placement. Capacity is an operator percentage of the physical size,
//! applied to future allocations only.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
mod free_list;
pub mod geometry;
pub mod grid;
pub mod slot;

pub use error::GridError;
pub use geometry::GridGeometry;
pub use grid::SlotGrid;
pub use slot::{Occupancy, Slot};
