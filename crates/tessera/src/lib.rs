//! Tessera: a live transaction grid for blockchain activity displays.
//!
//! Pending transaction identifiers are placed on uniformly random empty
//! slots of a fixed 2-D grid, freed again when a finalized block contains
//! them, and expired by a TTL when they never finalize. This facade crate
//! re-exports the public API from the Tessera sub-crates; for most users,
//! adding `tessera` as a single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::time::Instant;
//! use tessera::prelude::*;
//!
//! // A 16x16 grid, at most 95% occupied, 5-minute TTL.
//! let config = EngineConfig {
//!     rows: 16,
//!     cols: 16,
//!     ..Default::default()
//! };
//! let mut engine = Engine::new(&config, Box::new(NullSink)).unwrap();
//!
//! // The pending feed observed a transaction.
//! let now = Instant::now();
//! let placed = engine.submit_pending(TxId::from("0xabc"), SlotTag::pending(), now);
//! assert!(placed.is_some());
//! assert_eq!(engine.grid().active_count(), 1);
//!
//! // A finalized block contained it.
//! assert_eq!(engine.reconcile(&[TxId::from("0xabc")]), 1);
//! assert_eq!(engine.grid().active_count(), 0);
//! ```
//!
//! For deployment, [`LiveEngine`](engine::LiveEngine) runs the same engine
//! on a dedicated dispatch thread behind a bounded request channel.
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tessera-core` | IDs, slot states, updates, errors, the render seam |
//! | [`grid`] | `tessera-grid` | Grid geometry, slots, placement, capacity |
//! | [`engine`] | `tessera-engine` | The engine, expiry scheduler, dispatch thread |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, IDs, and the render seam (`tessera-core`).
pub use tessera_core as types;

/// Grid geometry, slots, and placement (`tessera-grid`).
pub use tessera_grid as grid;

/// Engine, expiry scheduling, and the dispatch thread (`tessera-engine`).
pub use tessera_engine as engine;

/// The types most users need, importable in one line.
pub mod prelude {
    pub use tessera_core::{
        AllocError, FreeCause, NullSink, RenderSink, SlotCoord, SlotState, SlotTag, SlotUpdate,
        TimerId, TxId, UpdateCause,
    };
    pub use tessera_engine::{
        ConfigError, Engine, EngineConfig, EngineMetrics, LiveEngine, SubmitError,
    };
    pub use tessera_grid::{GridError, GridGeometry, SlotGrid};
}
