//! Allocation, expiry, and reconciliation engine for the Tessera
//! transaction grid.
//!
//! [`Engine`] is the synchronous core: it owns the slot grid, the expiry
//! scheduler, the metrics, and the rendering sink, and is driven entirely
//! by its caller (time included). [`LiveEngine`] runs an `Engine` on a
//! dedicated dispatch thread fed by a bounded request channel, which is
//! the deployment shape: feed callbacks and timer fires interleave as
//! discrete atomic callbacks on one logical thread.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod expiry;
pub mod live;
pub mod metrics;

pub use config::{ConfigError, EngineConfig};
pub use engine::Engine;
pub use expiry::{Expired, ExpiryScheduler};
pub use live::{LiveEngine, SubmitError};
pub use metrics::EngineMetrics;
