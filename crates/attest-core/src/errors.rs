//! Unified error system for the Attest registry
//!
//! A single error type covers the four rejection kinds of the registry state
//! machine plus the failure kinds of its external collaborators. Every
//! operation returns these as values and leaves state unchanged on error.

use serde::{Deserialize, Serialize};

/// Unified error type for all registry operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum RegistryError {
    /// Caller is not the current admin
    #[error("Not authorized: {message}")]
    NotAuthorized {
        /// Error message describing the rejected caller
        message: String,
    },

    /// Researcher identity already has a record
    #[error("Already verified: {message}")]
    AlreadyVerified {
        /// Error message naming the duplicate identity
        message: String,
    },

    /// Researcher identity has no record
    #[error("Not found: {message}")]
    NotFound {
        /// Error message describing what was not found
        message: String,
    },

    /// Malformed identity, empty field, or out-of-domain score
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message describing the invalid input
        message: String,
    },

    /// Storage operation failed
    #[error("Storage error: {message}")]
    Storage {
        /// Error message describing the storage failure
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },

    /// Logical clock failed to produce a timestamp
    #[error("Clock error: {message}")]
    Clock {
        /// Error message describing the clock failure
        message: String,
    },
}

impl RegistryError {
    /// Create a not authorized error
    pub fn not_authorized(message: impl Into<String>) -> Self {
        Self::NotAuthorized {
            message: message.into(),
        }
    }

    /// Create an already verified error
    pub fn already_verified(message: impl Into<String>) -> Self {
        Self::AlreadyVerified {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a clock error
    pub fn clock(message: impl Into<String>) -> Self {
        Self::Clock {
            message: message.into(),
        }
    }

    /// Stable numeric code for hosts that surface contract-style error codes.
    pub fn code(&self) -> u32 {
        match self {
            Self::NotAuthorized { .. } => 1,
            Self::AlreadyVerified { .. } => 2,
            Self::NotFound { .. } => 3,
            Self::InvalidArgument { .. } => 4,
            Self::Storage { .. } => 5,
            Self::Serialization { .. } => 6,
            Self::Clock { .. } => 7,
        }
    }

    /// Whether this error is a rejection by the registry itself rather than
    /// a failure of the storage or clock collaborators.
    pub fn is_rejection(&self) -> bool {
        self.code() <= 4
    }
}

/// Standard Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<std::io::Error> for RegistryError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = RegistryError::not_authorized("caller ST2 is not admin");
        assert!(matches!(err, RegistryError::NotAuthorized { .. }));
        assert_eq!(err.to_string(), "Not authorized: caller ST2 is not admin");
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(RegistryError::not_authorized("x").code(), 1);
        assert_eq!(RegistryError::already_verified("x").code(), 2);
        assert_eq!(RegistryError::not_found("x").code(), 3);
        assert_eq!(RegistryError::invalid("x").code(), 4);
        assert_eq!(RegistryError::storage("x").code(), 5);
        assert_eq!(RegistryError::serialization("x").code(), 6);
        assert_eq!(RegistryError::clock("x").code(), 7);
    }

    #[test]
    fn test_rejection_classification() {
        assert!(RegistryError::not_found("x").is_rejection());
        assert!(!RegistryError::storage("disk full").is_rejection());
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = RegistryError::from(io_err);
        assert!(matches!(err, RegistryError::Storage { .. }));
    }
}
