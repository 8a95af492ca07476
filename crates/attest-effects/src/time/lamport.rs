//! Counter-based logical clock handler

use async_trait::async_trait;
use attest_core::effects::{ClockError, LogicalClockEffects};
use attest_core::LogicalTime;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Lamport-style logical clock
///
/// Each `logical_advance` returns a tick strictly greater than every tick
/// returned before. Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct LamportClockHandler {
    tick: Arc<AtomicU64>,
}

impl LamportClockHandler {
    /// Create a clock starting at tick 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock whose next advance returns `start + 1`
    pub fn starting_at(start: u64) -> Self {
        Self {
            tick: Arc::new(AtomicU64::new(start)),
        }
    }
}

#[async_trait]
impl LogicalClockEffects for LamportClockHandler {
    async fn logical_advance(&self) -> Result<LogicalTime, ClockError> {
        let previous = self
            .tick
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| t.checked_add(1))
            .map_err(|tick| ClockError::Exhausted { tick })?;
        Ok(LogicalTime::new(previous + 1))
    }

    async fn logical_now(&self) -> Result<LogicalTime, ClockError> {
        Ok(LogicalTime::new(self.tick.load(Ordering::SeqCst)))
    }
}
