//! Shared fixtures for registry integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use attest_core::effects::{StorageEffects, StorageError};
use attest_effects::{LamportClockHandler, MemoryStorageHandler};
use attest_registry::{PrincipalId, RegistryConfig, ResearcherRegistry};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const ADMIN: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
pub const OTHER: &str = "ST2JHG361ZXG51QTKY2NQCVBPPRRE2KZB1HR05NNC";
pub const RESEARCHER: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG";
pub const SUCCESSOR: &str = "ST3AM1A56AK2C1XAFJ4115ZSV26EB49BVQ10MGCS0";

pub type MemoryRegistry = ResearcherRegistry<MemoryStorageHandler, LamportClockHandler>;

pub fn principal(s: &str) -> PrincipalId {
    PrincipalId::new(s).unwrap()
}

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

pub async fn memory_registry() -> (MemoryRegistry, MemoryStorageHandler) {
    init_test_tracing();
    let storage = MemoryStorageHandler::new();
    let registry = ResearcherRegistry::open(
        storage.clone(),
        LamportClockHandler::new(),
        &RegistryConfig::with_admin(principal(ADMIN)),
    )
    .await
    .unwrap();
    (registry, storage)
}

/// Every key and value currently held by `storage`
pub async fn storage_snapshot<S: StorageEffects>(storage: &S) -> BTreeMap<String, Vec<u8>> {
    let mut snapshot = BTreeMap::new();
    for key in storage.list_keys(None).await.unwrap() {
        let value = storage.retrieve(&key).await.unwrap().unwrap();
        snapshot.insert(key, value);
    }
    snapshot
}

/// Memory storage whose writes can be made to fail on demand
#[derive(Clone, Default)]
pub struct FlakyStorage {
    inner: MemoryStorageHandler,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyStorage {
    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteFailed("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageEffects for FlakyStorage {
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.check()?;
        self.inner.store(key, value).await
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.inner.retrieve(key).await
    }

    async fn list_keys(&self, prefix: Option<&str>) -> Result<Vec<String>, StorageError> {
        self.inner.list_keys(prefix).await
    }

    async fn store_batch(&self, pairs: HashMap<String, Vec<u8>>) -> Result<(), StorageError> {
        self.check()?;
        self.inner.store_batch(pairs).await
    }
}
