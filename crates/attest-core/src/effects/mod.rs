//! Pure effect interfaces consumed by the registry
//!
//! The registry never touches disk or wall-clock time directly. Hosts supply
//! implementations of these traits; `attest-effects` ships the standard ones.

pub mod storage;
pub mod time;

pub use storage::{StorageEffects, StorageError};
pub use time::{ClockError, LogicalClockEffects};
