//! Principal identifiers used by the registry
//!
//! A `PrincipalId` names both callers and researchers. The host environment
//! authenticates callers before they reach the registry; this type only
//! guarantees that the identifier is well-formed and usable as a storage key.

use crate::errors::RegistryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a principal identifier in bytes.
pub const MAX_PRINCIPAL_LEN: usize = 128;

/// Opaque, comparable identity of a caller or researcher
///
/// Typically a public-key-derived address such as
/// `ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM`. Allowed characters are ASCII
/// alphanumerics plus `.`, `_`, `-` and `:`; the identifier is never empty
/// and never made only of dots, so it is always a usable path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Create a validated principal identifier
    pub fn new(value: impl Into<String>) -> Result<Self, RegistryError> {
        let value = value.into();
        Self::validate(&value)?;
        Ok(Self(value))
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(value: &str) -> Result<(), RegistryError> {
        if value.is_empty() {
            return Err(RegistryError::invalid("principal identifier cannot be empty"));
        }
        if value.len() > MAX_PRINCIPAL_LEN {
            return Err(RegistryError::invalid(format!(
                "principal identifier exceeds {MAX_PRINCIPAL_LEN} bytes"
            )));
        }
        if value.chars().all(|c| c == '.') {
            return Err(RegistryError::invalid(
                "principal identifier cannot consist only of dots",
            ));
        }
        if let Some(bad) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | ':')))
        {
            return Err(RegistryError::invalid(format!(
                "principal identifier contains invalid character {bad:?}"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PrincipalId {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PrincipalId {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PrincipalId> for String {
    fn from(id: PrincipalId) -> Self {
        id.0
    }
}

impl AsRef<str> for PrincipalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
