//! Researcher records and the reputation score domain

use crate::errors::RegistryError;
use crate::identifiers::PrincipalId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical timestamp produced by a `LogicalClockEffects` handler
///
/// Used to stamp `verification_date`. Values compare by their raw tick.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LogicalTime(pub u64);

impl LogicalTime {
    /// Create a logical time from a raw tick value
    pub fn new(tick: u64) -> Self {
        Self(tick)
    }

    /// Get the raw tick value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LogicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl From<u64> for LogicalTime {
    fn from(tick: u64) -> Self {
        Self(tick)
    }
}

/// Reputation score of a verified researcher
///
/// Always within `0..=max` for the `max` that was configured when the score
/// was set.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ReputationScore(u32);

impl ReputationScore {
    /// Score assigned at verification time
    pub const INITIAL: Self = Self(0);

    /// Validate a requested score against the configured upper bound.
    ///
    /// Negative values and values above `max` are rejected, never clamped.
    pub fn new(value: i64, max: u32) -> Result<Self, RegistryError> {
        if value < 0 {
            return Err(RegistryError::invalid(format!(
                "reputation score {value} is negative"
            )));
        }
        if value > i64::from(max) {
            return Err(RegistryError::invalid(format!(
                "reputation score {value} exceeds maximum {max}"
            )));
        }
        // Both bounds checked above, so the value fits in u32.
        Ok(Self(value as u32))
    }

    /// Get the raw score value
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ReputationScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persistent record of one verified researcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearcherRecord {
    /// Researcher identity (record key)
    pub identity: PrincipalId,
    /// Display name set at verification
    pub name: String,
    /// Organization set at verification
    pub organization: String,
    /// Logical time at which the record was committed
    pub verification_date: LogicalTime,
    /// Current reputation score
    pub reputation_score: ReputationScore,
}

impl ResearcherRecord {
    /// Create a freshly verified record with the initial score
    pub fn new(
        identity: PrincipalId,
        name: String,
        organization: String,
        verification_date: LogicalTime,
    ) -> Self {
        Self {
            identity,
            name,
            organization,
            verification_date,
            reputation_score: ReputationScore::INITIAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_score_domain_bounds() {
        assert_eq!(ReputationScore::new(0, 100).unwrap().value(), 0);
        assert_eq!(ReputationScore::new(100, 100).unwrap().value(), 100);
        assert_matches!(
            ReputationScore::new(-1, 100),
            Err(RegistryError::InvalidArgument { .. })
        );
        assert_matches!(
            ReputationScore::new(101, 100),
            Err(RegistryError::InvalidArgument { .. })
        );
    }

    #[test]
    fn test_score_rejects_values_beyond_u32() {
        let too_big = i64::from(u32::MAX) + 1;
        assert_matches!(
            ReputationScore::new(too_big, u32::MAX),
            Err(RegistryError::InvalidArgument { .. })
        );
        assert_eq!(
            ReputationScore::new(i64::from(u32::MAX), u32::MAX)
                .unwrap()
                .value(),
            u32::MAX
        );
    }

    #[test]
    fn test_new_record_starts_at_zero() {
        let record = ResearcherRecord::new(
            PrincipalId::new("ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG").unwrap(),
            "John Doe".to_string(),
            "Security Research Inc".to_string(),
            LogicalTime::new(12345),
        );
        assert_eq!(record.reputation_score, ReputationScore::INITIAL);

        let json = serde_json::to_string(&record).unwrap();
        let decoded: ResearcherRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, record);
    }
}
