//! O(1) uniform sampling over the currently-empty slot indices.
//!
//! The original placement policy drew random coordinates over the whole
//! grid until it hit an empty slot, which degenerates as occupancy
//! approaches the physical size. This structure keeps the empty indices in
//! a dense vector and draws uniformly from it: same observable distribution
//! (a uniformly random empty slot), constant cost, no non-termination case.

use rand::Rng;

const NONE: u32 = u32::MAX;

/// Dense set of free slot indices supporting uniform random removal.
///
/// `free` holds the free indices in arbitrary order; `pos[index]` is the
/// position of `index` within `free`, or [`NONE`] when the index is not
/// free. Removal swaps the victim with the tail and pops, keeping both
/// sides consistent in O(1).
#[derive(Clone, Debug)]
pub(crate) struct FreeList {
    free: Vec<u32>,
    pos: Vec<u32>,
}

impl FreeList {
    /// A free list over `count` indices, all initially free.
    pub fn with_all_free(count: usize) -> Self {
        Self {
            free: (0..count as u32).collect(),
            pos: (0..count as u32).collect(),
        }
    }

    /// Number of free indices.
    pub fn len(&self) -> usize {
        self.free.len()
    }

    /// Whether no index is free.
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Whether `index` is currently free.
    pub fn contains(&self, index: u32) -> bool {
        self.pos[index as usize] != NONE
    }

    /// Remove and return a uniformly random free index.
    pub fn draw<R: Rng>(&mut self, rng: &mut R) -> Option<u32> {
        if self.free.is_empty() {
            return None;
        }
        let at = rng.random_range(0..self.free.len());
        Some(self.remove_at(at))
    }

    /// Return `index` to the free set. The caller guarantees it is not
    /// already free.
    pub fn release(&mut self, index: u32) {
        debug_assert!(!self.contains(index), "release of an already-free index");
        self.pos[index as usize] = self.free.len() as u32;
        self.free.push(index);
    }

    /// Mark every index free again.
    pub fn reset_all_free(&mut self) {
        let count = self.pos.len();
        self.free.clear();
        self.free.extend(0..count as u32);
        for (i, p) in self.pos.iter_mut().enumerate() {
            *p = i as u32;
        }
    }

    fn remove_at(&mut self, at: usize) -> u32 {
        let index = self.free.swap_remove(at);
        self.pos[index as usize] = NONE;
        if let Some(&moved) = self.free.get(at) {
            self.pos[moved as usize] = at as u32;
        }
        index
    }
}
