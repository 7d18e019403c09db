//! The rendering seam between the engine and its display collaborator.

use crate::event::SlotUpdate;

/// Receives slot state transitions for display.
///
/// Implemented by the rendering collaborator (canvas, terminal, test
/// recorder). Called synchronously from the engine's dispatch context, so
/// implementations should be quick; anything expensive belongs on the
/// renderer's own thread.
///
/// `Send` because the engine and its sink move onto the dispatch thread
/// together.
pub trait RenderSink: Send {
    /// One slot changed state. The renderer should redraw exactly this
    /// slot.
    fn slot_changed(&mut self, update: &SlotUpdate);

    /// Every slot is now empty (reset or grid recreation). The renderer
    /// should redraw the whole grid.
    fn grid_cleared(&mut self);
}

/// A sink that discards every update.
///
/// Useful for headless operation and for tests that only inspect engine
/// state.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn slot_changed(&mut self, _update: &SlotUpdate) {}

    fn grid_cleared(&mut self) {}
}
