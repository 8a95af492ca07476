//! Logical clock effect handlers

mod lamport;
mod physical;

pub use lamport::LamportClockHandler;
pub use physical::PhysicalClockHandler;
