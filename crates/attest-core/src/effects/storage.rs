//! Key-value storage effect interface.
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effect
//! - **Implementation**: `attest-effects`
//! - **Usage**: Persisting the admin slot, researcher records and the journal
//!
//! Keys are `/`-separated paths. Records are never deleted, so the interface
//! only writes, reads and lists. `store_batch` must apply all pairs or none
//! from the point of view of a later `retrieve`.

use crate::errors::RegistryError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Error type for storage operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum StorageError {
    #[error("Invalid key: {reason}")]
    InvalidKey { reason: String },
    #[error("Read failed: {0}")]
    ReadFailed(String),
    #[error("Write failed: {0}")]
    WriteFailed(String),
}

impl From<StorageError> for RegistryError {
    fn from(err: StorageError) -> Self {
        RegistryError::storage(err.to_string())
    }
}

#[async_trait]
pub trait StorageEffects: Send + Sync {
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;
    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    async fn list_keys(&self, prefix: Option<&str>) -> Result<Vec<String>, StorageError>;
    async fn store_batch(&self, pairs: HashMap<String, Vec<u8>>) -> Result<(), StorageError>;
}

/// Blanket implementation for Arc<T> where T: StorageEffects
#[async_trait]
impl<T: StorageEffects + ?Sized> StorageEffects for std::sync::Arc<T> {
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        (**self).store(key, value).await
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).retrieve(key).await
    }

    async fn list_keys(&self, prefix: Option<&str>) -> Result<Vec<String>, StorageError> {
        (**self).list_keys(prefix).await
    }

    async fn store_batch(&self, pairs: HashMap<String, Vec<u8>>) -> Result<(), StorageError> {
        (**self).store_batch(pairs).await
    }
}
