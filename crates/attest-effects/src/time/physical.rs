//! Wall-clock backed logical clock handler

use async_trait::async_trait;
use attest_core::effects::{ClockError, LogicalClockEffects};
use attest_core::LogicalTime;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Logical clock that ticks in Unix milliseconds
///
/// Advances return `max(now_ms, last + 1)`, so the clock stays strictly
/// increasing across wall-clock adjustments and bursts within one millisecond.
#[derive(Debug, Clone, Default)]
pub struct PhysicalClockHandler {
    last: Arc<AtomicU64>,
}

impl PhysicalClockHandler {
    /// Create a new physical clock handler
    pub fn new() -> Self {
        Self::default()
    }

    fn wall_clock_ms() -> Result<u64, ClockError> {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ClockError::OperationFailed {
                reason: format!("System clock before Unix epoch: {e}"),
            })?;
        u64::try_from(elapsed.as_millis()).map_err(|_| ClockError::OperationFailed {
            reason: "System clock out of range".to_string(),
        })
    }
}

#[async_trait]
impl LogicalClockEffects for PhysicalClockHandler {
    async fn logical_advance(&self) -> Result<LogicalTime, ClockError> {
        let now = Self::wall_clock_ms()?;
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                last.checked_add(1).map(|next| next.max(now))
            })
            .map_err(|tick| ClockError::Exhausted { tick })?;
        Ok(LogicalTime::new(previous.saturating_add(1).max(now)))
    }

    async fn logical_now(&self) -> Result<LogicalTime, ClockError> {
        let now = Self::wall_clock_ms()?;
        Ok(LogicalTime::new(self.last.load(Ordering::SeqCst).max(now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_physical_clock_is_monotonic() {
        let clock = PhysicalClockHandler::new();
        let mut previous = clock.logical_advance().await.unwrap();
        for _ in 0..100 {
            let next = clock.logical_advance().await.unwrap();
            assert!(next > previous);
            previous = next;
        }
        assert!(clock.logical_now().await.unwrap() >= previous);
    }
}
