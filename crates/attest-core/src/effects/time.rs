//! Logical clock effect interface.
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effect
//! - **Implementation**: `attest-effects`
//! - **Usage**: Stamping `verification_date` and journal entries
//!
//! `logical_advance` moves the clock forward and returns the new tick;
//! `logical_now` observes the current tick without moving it.

use crate::errors::RegistryError;
use crate::records::LogicalTime;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error type for clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ClockError {
    #[error("Clock exhausted at tick {tick}")]
    Exhausted { tick: u64 },
    #[error("Time service unavailable")]
    ServiceUnavailable,
    #[error("Operation failed: {reason}")]
    OperationFailed { reason: String },
}

impl From<ClockError> for RegistryError {
    fn from(err: ClockError) -> Self {
        RegistryError::clock(err.to_string())
    }
}

#[async_trait]
pub trait LogicalClockEffects: Send + Sync {
    async fn logical_advance(&self) -> Result<LogicalTime, ClockError>;
    async fn logical_now(&self) -> Result<LogicalTime, ClockError>;
}

/// Blanket implementation for Arc<T> where T: LogicalClockEffects
#[async_trait]
impl<T: LogicalClockEffects + ?Sized> LogicalClockEffects for std::sync::Arc<T> {
    async fn logical_advance(&self) -> Result<LogicalTime, ClockError> {
        (**self).logical_advance().await
    }

    async fn logical_now(&self) -> Result<LogicalTime, ClockError> {
        (**self).logical_now().await
    }
}
