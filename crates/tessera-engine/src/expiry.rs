//! Deadline-ordered expiry timers, one per occupancy.
//!
//! Each occupancy gets a fresh [`TimerId`] from a monotonic counter;
//! handles are never reused, so stale handles are inert. Live timers are
//! kept in an [`IndexMap`]; the deadline order is a binary heap whose
//! entries are discarded lazily when they surface after cancellation.
//! The per-timer state machine is `Scheduled -> {Fired | Cancelled}`,
//! both terminal.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use smallvec::SmallVec;

use tessera_core::{SlotCoord, TimerId};

/// One timer that reached its deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Expired {
    /// The fired timer's handle.
    pub timer: TimerId,
    /// The slot the timer was armed for.
    pub coord: SlotCoord,
}

/// Schedules and cancels the per-occupancy expiry timers.
///
/// Purely deadline-driven: the owner calls [`due`](Self::due) with the
/// current instant to collect fired timers, and uses
/// [`next_deadline`](Self::next_deadline) to bound how long it may sleep.
#[derive(Debug)]
pub struct ExpiryScheduler {
    ttl: Duration,
    next_timer: u64,
    live: IndexMap<TimerId, SlotCoord>,
    deadlines: BinaryHeap<Reverse<(Instant, TimerId)>>,
}

impl ExpiryScheduler {
    /// A scheduler arming every timer with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            next_timer: 0,
            live: IndexMap::new(),
            deadlines: BinaryHeap::new(),
        }
    }

    /// The fixed TTL applied to every scheduled timer.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of currently scheduled (not fired, not cancelled) timers.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no timer is scheduled.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Schedule a fresh timer for `coord`, due at `now + ttl`.
    pub fn schedule(&mut self, coord: SlotCoord, now: Instant) -> TimerId {
        self.next_timer += 1;
        let timer = TimerId(self.next_timer);
        self.live.insert(timer, coord);
        self.deadlines.push(Reverse((now + self.ttl, timer)));
        timer
    }

    /// Cancel a scheduled timer.
    ///
    /// Returns whether the timer was still scheduled. Idempotent: a handle
    /// that already fired or was already cancelled is a no-op returning
    /// `false`. The heap entry is left in place and discarded when popped.
    pub fn cancel(&mut self, timer: TimerId) -> bool {
        self.live.swap_remove(&timer).is_some()
    }

    /// Collect every timer whose deadline has passed, in deadline order.
    ///
    /// Fired timers leave the scheduler; cancelled entries surfacing from
    /// the heap are dropped silently.
    pub fn due(&mut self, now: Instant) -> SmallVec<[Expired; 4]> {
        let mut fired = SmallVec::new();
        while let Some(&Reverse((deadline, timer))) = self.deadlines.peek() {
            if deadline > now {
                break;
            }
            self.deadlines.pop();
            if let Some(coord) = self.live.swap_remove(&timer) {
                fired.push(Expired { timer, coord });
            }
        }
        fired
    }

    /// The earliest deadline among still-scheduled timers.
    ///
    /// Prunes cancelled entries off the top of the heap as a side effect.
    pub fn next_deadline(&mut self) -> Option<Instant> {
        while let Some(&Reverse((deadline, timer))) = self.deadlines.peek() {
            if self.live.contains_key(&timer) {
                return Some(deadline);
            }
            self.deadlines.pop();
        }
        None
    }

    /// Drop every scheduled timer. Nothing fires afterwards.
    pub fn clear(&mut self) {
        self.live.clear();
        self.deadlines.clear();
    }
}
