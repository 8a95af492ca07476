//! Attest Registry - Admin-Gated Researcher Verification
//!
//! Two components over one shared store:
//!
//! - [`AdminGate`]: the single admin slot; authorizes every gated write and
//!   supports handing the role to another identity.
//! - [`ResearcherRegistry`]: one [`ResearcherRecord`] per researcher identity,
//!   with verification, absolute reputation updates and public reads.
//!
//! ```ignore
//! let registry = ResearcherRegistry::open(storage, clock, &config).await?;
//! registry.verify_researcher(&admin, &researcher, "John Doe", "Security Research Inc").await?;
//! registry.update_reputation(&admin, &researcher, 150).await?;
//! assert!(registry.is_verified(&researcher).await);
//! ```

#![forbid(unsafe_code)]

pub mod gate;
mod layout;
pub mod registry;

pub use attest_core::{
    FactEnvelope, LogicalTime, PrincipalId, RegistryConfig, RegistryError, RegistryFact,
    ReputationScore, ResearcherRecord, Result,
};
pub use gate::AdminGate;
pub use registry::ResearcherRegistry;
