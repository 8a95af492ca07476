//! Registry configuration
//!
//! Configuration is read from TOML, then overridden by `ATTEST_`-prefixed
//! environment variables, then validated as a whole.
//!
//! ```toml
//! bootstrap_admin = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM"
//!
//! [limits]
//! max_name_len = 100
//! max_organization_len = 100
//! max_reputation_score = 10000
//!
//! [storage]
//! backend = "filesystem"
//! path = "./attest-data"
//! ```

use crate::errors::RegistryError;
use crate::identifiers::PrincipalId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "ATTEST_";

/// Top-level registry configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Admin installed the first time the registry is opened on empty storage
    pub bootstrap_admin: Option<PrincipalId>,
    /// Field and score bounds
    pub limits: RegistryLimits,
    /// Storage backend selection
    pub storage: StorageConfig,
}

/// Bounds enforced on verification and reputation updates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryLimits {
    /// Maximum researcher name length in characters
    pub max_name_len: usize,
    /// Maximum organization length in characters
    pub max_organization_len: usize,
    /// Inclusive upper bound of the reputation score domain
    pub max_reputation_score: u32,
}

impl Default for RegistryLimits {
    fn default() -> Self {
        Self {
            max_name_len: 100,
            max_organization_len: 100,
            max_reputation_score: 10_000,
        }
    }
}

/// Storage backend kinds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Volatile in-process storage
    #[default]
    Memory,
    /// One file per key under `path`
    Filesystem,
}

/// Storage configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Selected backend
    pub backend: StorageBackend,
    /// Base directory for the filesystem backend
    pub path: Option<PathBuf>,
}

/// A single configuration problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Offending field, in dotted form
    pub field: String,
    /// What is wrong with it
    pub error: String,
}

impl RegistryConfig {
    /// Create a configuration with the given bootstrap admin and defaults elsewhere
    pub fn with_admin(admin: PrincipalId) -> Self {
        Self {
            bootstrap_admin: Some(admin),
            ..Self::default()
        }
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self, RegistryError> {
        toml::from_str(contents)
            .map_err(|e| RegistryError::invalid(format!("Invalid configuration TOML: {e}")))
    }

    /// Load configuration from a file, apply environment overrides and validate
    pub fn load_from_file(path: &Path) -> Result<Self, RegistryError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RegistryError::storage(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let mut config = Self::from_toml_str(&contents)?;
        config.merge_with_env()?;
        config.validate()?;

        tracing::debug!(path = %path.display(), backend = ?config.storage.backend, "Loaded registry configuration");
        Ok(config)
    }

    /// Merge `ATTEST_*` variables from the process environment
    pub fn merge_with_env(&mut self) -> Result<(), RegistryError> {
        self.merge_with_vars(std::env::vars())
    }

    /// Merge `ATTEST_*` overrides from an arbitrary variable source
    pub fn merge_with_vars<I>(&mut self, vars: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name {
                "BOOTSTRAP_ADMIN" => self.bootstrap_admin = Some(value.parse()?),
                "MAX_NAME_LEN" => self.limits.max_name_len = parse_number(&key, &value)?,
                "MAX_ORGANIZATION_LEN" => {
                    self.limits.max_organization_len = parse_number(&key, &value)?;
                }
                "MAX_REPUTATION_SCORE" => {
                    self.limits.max_reputation_score = parse_number(&key, &value)?;
                }
                "STORAGE_BACKEND" => {
                    self.storage.backend = match value.to_ascii_lowercase().as_str() {
                        "memory" => StorageBackend::Memory,
                        "filesystem" => StorageBackend::Filesystem,
                        other => {
                            return Err(RegistryError::invalid(format!(
                                "{key}: unknown storage backend {other:?}"
                            )))
                        }
                    };
                }
                "STORAGE_PATH" => self.storage.path = Some(PathBuf::from(value)),
                _ => tracing::debug!(variable = %key, "Ignoring unknown configuration variable"),
            }
        }
        Ok(())
    }

    /// Collect every validation problem without stopping at the first
    pub fn validation_errors(&self) -> Vec<ConfigValidationError> {
        let mut errors = vec![];

        if self.bootstrap_admin.is_none() {
            errors.push(ConfigValidationError {
                field: "bootstrap_admin".to_string(),
                error: "A bootstrap admin identity is required".to_string(),
            });
        }

        if self.limits.max_name_len == 0 {
            errors.push(ConfigValidationError {
                field: "limits.max_name_len".to_string(),
                error: "Name length limit must be at least 1".to_string(),
            });
        }

        if self.limits.max_organization_len == 0 {
            errors.push(ConfigValidationError {
                field: "limits.max_organization_len".to_string(),
                error: "Organization length limit must be at least 1".to_string(),
            });
        }

        if self.storage.backend == StorageBackend::Filesystem && self.storage.path.is_none() {
            errors.push(ConfigValidationError {
                field: "storage.path".to_string(),
                error: "Filesystem storage requires a path".to_string(),
            });
        }

        errors
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RegistryError> {
        let errors = self.validation_errors();
        if errors.is_empty() {
            return Ok(());
        }

        let summary = errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.error))
            .collect::<Vec<_>>()
            .join("; ");
        Err(RegistryError::invalid(format!(
            "Invalid configuration: {summary}"
        )))
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, RegistryError> {
    value
        .trim()
        .parse()
        .map_err(|_| RegistryError::invalid(format!("{key}: expected a number, got {value:?}")))
}
