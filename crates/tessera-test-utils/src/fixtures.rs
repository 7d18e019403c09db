//! Shared scenario helpers.

use tessera_core::{SlotUpdate, UpdateCause};

/// Split a delivered update stream into (allocations, frees).
///
/// Frees are anything with an empty end state: expiry, reconciliation,
/// or clearing.
pub fn split_allocs_frees(updates: &[SlotUpdate]) -> (Vec<&SlotUpdate>, Vec<&SlotUpdate>) {
    updates
        .iter()
        .partition(|u| u.cause == UpdateCause::Allocated)
}
