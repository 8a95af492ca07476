//! Attest Core - Registry Foundation Types
//!
//! This crate provides the foundational types and effect interfaces for the
//! Attest researcher registry. It contains no storage or clock implementations;
//! those live in `attest-effects`, and the gated state machine lives in
//! `attest-registry`.
//!
//! # Contents
//!
//! - `PrincipalId`: validated caller/researcher identity
//! - `ResearcherRecord`, `ReputationScore`, `LogicalTime`: persistent record types
//! - `RegistryFact`: append-only audit journal entries
//! - `RegistryError`: unified error type with stable numeric codes
//! - `RegistryConfig`: TOML + environment configuration
//! - `StorageEffects`, `LogicalClockEffects`: pure effect interfaces

#![forbid(unsafe_code)]

/// Caller and researcher identifiers
pub mod identifiers;

/// Researcher records and score domain
pub mod records;

/// Audit journal facts
pub mod facts;

/// Unified error handling
pub mod errors;

/// Registry configuration
pub mod config;

/// Pure effect interfaces (no implementations)
pub mod effects;

pub use config::{RegistryConfig, RegistryLimits, StorageBackend, StorageConfig};
pub use errors::{RegistryError, Result};
pub use facts::{FactEnvelope, RegistryFact};
pub use identifiers::PrincipalId;
pub use records::{LogicalTime, ReputationScore, ResearcherRecord};
