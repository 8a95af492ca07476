//! Audit journal facts
//!
//! Every committed mutation of the registry appends exactly one fact. Facts
//! are immutable once written and are ordered by their sequence number.

use crate::identifiers::PrincipalId;
use crate::records::{LogicalTime, ReputationScore};
use serde::{Deserialize, Serialize};

/// A committed registry mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryFact {
    /// A researcher record was created
    ResearcherVerified {
        /// Newly verified researcher
        researcher: PrincipalId,
    },
    /// A researcher's score was replaced
    ReputationUpdated {
        /// Researcher whose score changed
        researcher: PrincipalId,
        /// Score before the update
        previous: ReputationScore,
        /// Score after the update
        current: ReputationScore,
    },
    /// The admin role moved to a new identity
    AdminTransferred {
        /// Admin before the transfer
        previous: PrincipalId,
        /// Admin after the transfer
        current: PrincipalId,
    },
}

impl RegistryFact {
    /// Short label for logging and filtering
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ResearcherVerified { .. } => "researcher_verified",
            Self::ReputationUpdated { .. } => "reputation_updated",
            Self::AdminTransferred { .. } => "admin_transferred",
        }
    }
}

/// A fact together with its journal position and provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactEnvelope {
    /// Position in the journal, starting at 1
    pub sequence: u64,
    /// Logical time at which the mutation committed
    pub recorded_at: LogicalTime,
    /// Admin that performed the mutation
    pub actor: PrincipalId,
    /// The mutation itself
    pub fact: RegistryFact,
}
