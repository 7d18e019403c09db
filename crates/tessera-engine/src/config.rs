//! Engine configuration, validation, and error types.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use tessera_grid::{GridError, GridGeometry};

/// Complete configuration for constructing an engine.
///
/// `validate()` checks all structural invariants at startup; both
/// [`Engine::new`](crate::Engine::new) and
/// [`LiveEngine::new`](crate::LiveEngine::new) call it before building
/// anything.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Grid rows. Default: 64.
    pub rows: u32,
    /// Grid columns. Default: 64.
    pub cols: u32,
    /// Percentage of the physical grid that may be occupied at once,
    /// 0–100. Default: 95.
    pub capacity_percent: u8,
    /// How long an unreconciled occupancy lives before it is freed.
    /// Default: 5 minutes.
    pub ttl: Duration,
    /// Seed for the placement RNG stream. Default: 0.
    pub seed: u64,
    /// Capacity of the bounded request channel feeding the dispatch
    /// thread. Default: 64.
    pub max_feed_queue: usize,
    /// Upper bound on how long the dispatch thread sleeps between
    /// wake-ups when no timer deadline is nearer. Default: 250 ms.
    pub idle_tick: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rows: 64,
            cols: 64,
            capacity_percent: 95,
            ttl: Duration::from_secs(5 * 60),
            seed: 0,
            max_feed_queue: 64,
            idle_tick: Duration::from_millis(250),
        }
    }
}

impl EngineConfig {
    /// Check all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        GridGeometry::new(self.rows, self.cols)?;
        if self.ttl.is_zero() {
            return Err(ConfigError::ZeroTtl);
        }
        if self.max_feed_queue == 0 {
            return Err(ConfigError::FeedQueueZero);
        }
        if self.idle_tick.is_zero() {
            return Err(ConfigError::ZeroIdleTick);
        }
        Ok(())
    }
}

/// Errors detected during [`EngineConfig::validate()`] or engine startup.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The grid dimensions are invalid.
    Grid(GridError),
    /// The TTL is zero; every occupancy would expire immediately.
    ZeroTtl,
    /// The request channel capacity is zero.
    FeedQueueZero,
    /// The idle tick is zero; the dispatch thread would spin.
    ZeroIdleTick,
    /// The dispatch thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of the spawn failure.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(e) => write!(f, "grid: {e}"),
            Self::ZeroTtl => write!(f, "ttl must be non-zero"),
            Self::FeedQueueZero => write!(f, "max_feed_queue must be at least 1"),
            Self::ZeroIdleTick => write!(f, "idle_tick must be non-zero"),
            Self::ThreadSpawnFailed { reason } => {
                write!(f, "thread spawn failed: {reason}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for ConfigError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}
