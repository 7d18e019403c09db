//! Threaded engine: a dispatch loop fed by a bounded request channel.
//!
//! ```text
//! Feed / control threads            Dispatch thread
//!     |                                  |
//!     |--submit_pending()--------------->| cmd_rx.recv_timeout(..)
//!     |   [cmd_tx: bounded(64)]          | engine.submit_pending(..)
//!     |--submit_finalized()------------->| engine.reconcile(..)
//!     |--set_capacity_percent()--------->| engine.set_capacity_percent(..)
//!     |                                  | engine.poll_expired(now)
//!     |                                  | sleep(min(next_deadline, idle))
//!     |--shutdown()---------------------:| flag + disconnect, join
//!     |<--Engine (recovered)             |
//! ```
//!
//! Every request is handled as one atomic callback on the dispatch
//! thread; expirations are polled between callbacks. This serializes the
//! two event producers (feeds and timers) into a single logical thread,
//! so the only races are between distinct callbacks — and the engine's
//! free path is idempotent precisely so those are harmless.

use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use tracing::warn;

use tessera_core::{RenderSink, SlotTag, TxId};

use crate::config::{ConfigError, EngineConfig};
use crate::engine::Engine;

/// Error submitting a request to the dispatch thread.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmitError {
    /// The dispatch thread has shut down.
    Shutdown,
    /// The request channel is full (back-pressure); the request is
    /// dropped, as a rejected allocation would be.
    ChannelFull,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shutdown => write!(f, "dispatch thread has shut down"),
            Self::ChannelFull => write!(f, "request channel full"),
        }
    }
}

impl Error for SubmitError {}

/// A request for the dispatch thread.
#[derive(Clone, Debug)]
enum Request {
    Pending { tx: TxId, tag: SlotTag },
    Finalized(Vec<TxId>),
    SetCapacity(u8),
    Reset,
    Recreate { rows: u32, cols: u32 },
}

/// Engine running on a dedicated dispatch thread.
///
/// Construction spawns the thread; [`shutdown`](Self::shutdown) (or drop)
/// stops it and recovers the [`Engine`] for inspection.
pub struct LiveEngine {
    cmd_tx: Option<Sender<Request>>,
    shutdown_flag: Arc<AtomicBool>,
    loop_thread: Option<JoinHandle<Engine>>,
}

impl LiveEngine {
    /// Validate `config`, build the engine, and spawn the dispatch thread.
    pub fn new(config: &EngineConfig, sink: Box<dyn RenderSink>) -> Result<Self, ConfigError> {
        let engine = Engine::new(config, sink)?;
        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(config.max_feed_queue);
        let shutdown_flag = Arc::new(AtomicBool::new(false));

        let state = DispatchLoop {
            engine,
            cmd_rx,
            shutdown_flag: Arc::clone(&shutdown_flag),
            idle_tick: config.idle_tick,
        };
        let loop_thread = thread::Builder::new()
            .name("tessera-dispatch".into())
            .spawn(move || state.run())
            .map_err(|e| ConfigError::ThreadSpawnFailed {
                reason: e.to_string(),
            })?;

        Ok(Self {
            cmd_tx: Some(cmd_tx),
            shutdown_flag,
            loop_thread: Some(loop_thread),
        })
    }

    /// Offer a pending identifier for placement. Non-blocking.
    pub fn submit_pending(&self, tx: TxId, tag: SlotTag) -> Result<(), SubmitError> {
        self.send(Request::Pending { tx, tag })
    }

    /// Deliver one finalized block's identifier batch. Non-blocking.
    pub fn submit_finalized(&self, batch: Vec<TxId>) -> Result<(), SubmitError> {
        self.send(Request::Finalized(batch))
    }

    /// Change the capacity percentage for future allocations.
    pub fn set_capacity_percent(&self, percent: u8) -> Result<(), SubmitError> {
        self.send(Request::SetCapacity(percent))
    }

    /// Free every slot and request a full redraw.
    pub fn reset(&self) -> Result<(), SubmitError> {
        self.send(Request::Reset)
    }

    /// Rebuild the grid with new dimensions, discarding all occupancy.
    pub fn recreate(&self, rows: u32, cols: u32) -> Result<(), SubmitError> {
        self.send(Request::Recreate { rows, cols })
    }

    /// Stop the dispatch thread and recover the engine.
    ///
    /// Returns `None` if the thread panicked.
    pub fn shutdown(mut self) -> Option<Engine> {
        self.shutdown_inner()
    }

    fn shutdown_inner(&mut self) -> Option<Engine> {
        self.shutdown_flag.store(true, Ordering::Release);
        // Disconnecting the channel wakes the loop immediately.
        self.cmd_tx = None;
        self.loop_thread.take().and_then(|handle| handle.join().ok())
    }

    fn send(&self, request: Request) -> Result<(), SubmitError> {
        let cmd_tx = self.cmd_tx.as_ref().ok_or(SubmitError::Shutdown)?;
        cmd_tx.try_send(request).map_err(|e| match e {
            TrySendError::Full(_) => SubmitError::ChannelFull,
            TrySendError::Disconnected(_) => SubmitError::Shutdown,
        })
    }
}

impl Drop for LiveEngine {
    fn drop(&mut self) {
        let _ = self.shutdown_inner();
    }
}

/// State owned by the dispatch thread.
struct DispatchLoop {
    engine: Engine,
    cmd_rx: Receiver<Request>,
    shutdown_flag: Arc<AtomicBool>,
    idle_tick: Duration,
}

impl DispatchLoop {
    /// Run until shutdown. Consumes self and returns the engine so the
    /// caller can recover it through the join handle.
    fn run(mut self) -> Engine {
        loop {
            if self.shutdown_flag.load(Ordering::Acquire) {
                break;
            }

            // Sleep no longer than the nearest expiry deadline, capped by
            // the idle tick so shutdown is observed promptly.
            let now = Instant::now();
            let timeout = self
                .engine
                .next_deadline()
                .map(|deadline| deadline.saturating_duration_since(now))
                .unwrap_or(self.idle_tick)
                .min(self.idle_tick);

            match self.cmd_rx.recv_timeout(timeout) {
                Ok(request) => {
                    self.handle(request);
                    // Drain whatever queued up behind it.
                    while let Ok(more) = self.cmd_rx.try_recv() {
                        self.handle(more);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            self.engine.poll_expired(Instant::now());
        }
        self.engine
    }

    fn handle(&mut self, request: Request) {
        match request {
            Request::Pending { tx, tag } => {
                self.engine.submit_pending(tx, tag, Instant::now());
            }
            Request::Finalized(batch) => {
                self.engine.reconcile(&batch);
            }
            Request::SetCapacity(percent) => self.engine.set_capacity_percent(percent),
            Request::Reset => self.engine.reset(),
            Request::Recreate { rows, cols } => {
                if let Err(e) = self.engine.recreate(rows, cols) {
                    warn!(error = %e, "grid recreation rejected");
                }
            }
        }
    }
}
