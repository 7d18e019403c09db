//! End-to-end scenarios through the dispatch thread: the pending feed,
//! the finality feed, capacity control, reset, and TTL expiry all driven
//! through the public `LiveEngine` handle.
//!
//! These tests sleep real (small) durations, so TTLs here are tens of
//! milliseconds and every wait leaves generous slack.

use std::thread;
use std::time::Duration;

use tessera_core::{SlotTag, UpdateCause};
use tessera_engine::{EngineConfig, LiveEngine};
use tessera_test_utils::fixtures::split_allocs_frees;
use tessera_test_utils::{tx, RecordingSink};

fn config(ttl_ms: u64) -> EngineConfig {
    EngineConfig {
        rows: 8,
        cols: 8,
        capacity_percent: 100,
        ttl: Duration::from_millis(ttl_ms),
        idle_tick: Duration::from_millis(5),
        seed: 1,
        ..Default::default()
    }
}

fn settle() {
    thread::sleep(Duration::from_millis(50));
}

#[test]
fn pending_then_finalized_roundtrip() {
    let sink = RecordingSink::new();
    let record = sink.record();
    let live = LiveEngine::new(&config(60_000), Box::new(sink)).unwrap();

    live.submit_pending(tx(1), SlotTag::pending()).unwrap();
    live.submit_pending(tx(2), SlotTag::pending()).unwrap();
    settle();
    live.submit_finalized(vec![tx(1)]).unwrap();
    settle();

    let engine = live.shutdown().expect("dispatch thread joins cleanly");
    assert_eq!(engine.metrics().allocated, 2);
    assert_eq!(engine.metrics().reconciled, 1);
    assert_eq!(engine.grid().active_count(), 1);

    let updates = record.updates();
    let (allocs, frees) = split_allocs_frees(&updates);
    assert_eq!(allocs.len(), 2);
    assert_eq!(frees.len(), 1);
    assert_eq!(frees[0].cause, UpdateCause::Reconciled);
    assert_eq!(frees[0].coord, allocs[0].coord, "first placement was freed");
}

#[test]
fn unfinalized_transactions_expire() {
    let sink = RecordingSink::new();
    let record = sink.record();
    let live = LiveEngine::new(&config(40), Box::new(sink)).unwrap();

    live.submit_pending(tx(1), SlotTag::pending()).unwrap();
    thread::sleep(Duration::from_millis(200));

    let engine = live.shutdown().expect("dispatch thread joins cleanly");
    assert_eq!(engine.metrics().expired, 1);
    assert_eq!(engine.grid().active_count(), 0);
    assert_eq!(record.with_cause(UpdateCause::Expired).len(), 1);
}

#[test]
fn empty_finalized_batches_are_skipped() {
    let live = LiveEngine::new(&config(60_000), Box::new(RecordingSink::new())).unwrap();
    for _ in 0..5 {
        live.submit_finalized(Vec::new()).unwrap();
    }
    settle();

    let engine = live.shutdown().expect("dispatch thread joins cleanly");
    assert_eq!(engine.metrics().empty_batches, 5);
    assert_eq!(engine.metrics().reconciled, 0);
}

#[test]
fn capacity_control_applies_to_future_submissions() {
    let live = LiveEngine::new(&config(60_000), Box::new(RecordingSink::new())).unwrap();
    live.set_capacity_percent(0).unwrap();
    settle();
    live.submit_pending(tx(1), SlotTag::pending()).unwrap();
    settle();

    let engine = live.shutdown().expect("dispatch thread joins cleanly");
    assert_eq!(engine.metrics().allocated, 0);
    assert_eq!(engine.metrics().capacity_rejections, 1);
}

#[test]
fn reset_empties_the_grid_and_requests_redraw() {
    let sink = RecordingSink::new();
    let record = sink.record();
    let live = LiveEngine::new(&config(60_000), Box::new(sink)).unwrap();

    for i in 0..10 {
        live.submit_pending(tx(i), SlotTag::pending()).unwrap();
    }
    settle();
    live.reset().unwrap();
    settle();

    let engine = live.shutdown().expect("dispatch thread joins cleanly");
    assert_eq!(engine.grid().active_count(), 0);
    assert_eq!(engine.metrics().resets, 1);
    assert_eq!(record.cleared_count(), 1);
}

#[test]
fn recreate_changes_geometry_in_flight() {
    let sink = RecordingSink::new();
    let record = sink.record();
    let live = LiveEngine::new(&config(60_000), Box::new(sink)).unwrap();

    live.submit_pending(tx(1), SlotTag::pending()).unwrap();
    settle();
    live.recreate(16, 2).unwrap();
    settle();

    let engine = live.shutdown().expect("dispatch thread joins cleanly");
    assert_eq!(engine.grid().geometry().rows(), 16);
    assert_eq!(engine.grid().geometry().cols(), 2);
    assert_eq!(engine.grid().active_count(), 0);
    assert_eq!(record.cleared_count(), 1);
}
