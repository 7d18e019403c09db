//! Test utilities and mock types for Tessera development.
//!
//! Provides [`RecordingSink`], a [`RenderSink`] that records every update
//! for later assertion, plus small identifier helpers shared across test
//! suites.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tessera_core::{RenderSink, SlotUpdate, TxId, UpdateCause};

pub mod fixtures;

/// A sink that records every update it receives.
///
/// The sink itself moves into the engine; keep a [`SinkRecord`] handle
/// (from [`RecordingSink::record`]) on the test side to inspect what was
/// delivered, including across threads.
#[derive(Debug, Default)]
pub struct RecordingSink {
    updates: Arc<Mutex<Vec<SlotUpdate>>>,
    cleared: Arc<AtomicUsize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle observing everything this sink receives.
    pub fn record(&self) -> SinkRecord {
        SinkRecord {
            updates: Arc::clone(&self.updates),
            cleared: Arc::clone(&self.cleared),
        }
    }
}

impl RenderSink for RecordingSink {
    fn slot_changed(&mut self, update: &SlotUpdate) {
        self.updates
            .lock()
            .expect("recording sink lock poisoned")
            .push(update.clone());
    }

    fn grid_cleared(&mut self) {
        self.cleared.fetch_add(1, Ordering::SeqCst);
    }
}

/// Read side of a [`RecordingSink`].
#[derive(Clone, Debug)]
pub struct SinkRecord {
    updates: Arc<Mutex<Vec<SlotUpdate>>>,
    cleared: Arc<AtomicUsize>,
}

impl SinkRecord {
    /// Snapshot of every update delivered so far.
    pub fn updates(&self) -> Vec<SlotUpdate> {
        self.updates
            .lock()
            .expect("recording sink lock poisoned")
            .clone()
    }

    /// Updates with the given cause, in delivery order.
    pub fn with_cause(&self, cause: UpdateCause) -> Vec<SlotUpdate> {
        self.updates()
            .into_iter()
            .filter(|u| u.cause == cause)
            .collect()
    }

    /// Number of full-redraw requests delivered so far.
    pub fn cleared_count(&self) -> usize {
        self.cleared.load(Ordering::SeqCst)
    }
}

/// A short hex-style identifier derived from `n`.
pub fn tx(n: u32) -> TxId {
    TxId::from(format!("0x{n:08x}"))
}
