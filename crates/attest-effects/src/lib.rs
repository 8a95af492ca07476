//! Attest Effects - Standard Effect Handlers
//!
//! Implementations of the `attest-core` effect interfaces:
//!
//! - `MemoryStorageHandler`: volatile storage for tests and ephemeral hosts
//! - `FilesystemStorageHandler`: durable one-file-per-key storage
//! - `LamportClockHandler`: counter-based logical clock
//! - `PhysicalClockHandler`: wall-clock milliseconds, forced monotonic
//!
//! plus `logging::init_tracing` for hosts that want the standard subscriber.

#![forbid(unsafe_code)]

pub mod logging;
pub mod storage;
pub mod time;

pub use storage::{FilesystemStorageHandler, MemoryStorageHandler};
pub use time::{LamportClockHandler, PhysicalClockHandler};
