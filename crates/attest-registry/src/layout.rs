//! Storage layout of the registry
//!
//! ```text
//! registry/admin                         -> PrincipalId
//! registry/researcher/<identity>         -> ResearcherRecord
//! registry/journal/<sequence, 20 digits> -> FactEnvelope
//! ```
//!
//! Values are JSON. Journal keys are zero-padded so lexicographic key order
//! equals commit order.

use attest_core::effects::StorageEffects;
use attest_core::{FactEnvelope, PrincipalId, RegistryError, ResearcherRecord, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

pub(crate) const ADMIN_KEY: &str = "registry/admin";
pub(crate) const RESEARCHER_PREFIX: &str = "registry/researcher/";
pub(crate) const JOURNAL_PREFIX: &str = "registry/journal/";

pub(crate) fn researcher_key(identity: &PrincipalId) -> String {
    format!("{RESEARCHER_PREFIX}{identity}")
}

pub(crate) fn journal_key(sequence: u64) -> String {
    format!("{JOURNAL_PREFIX}{sequence:020}")
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| RegistryError::serialization(format!("Corrupt value at {key}: {e}")))
}

/// Everything the registry persists
#[derive(Debug)]
pub(crate) struct StoredState {
    pub admin: Option<PrincipalId>,
    pub researchers: BTreeMap<PrincipalId, ResearcherRecord>,
    pub journal: Vec<FactEnvelope>,
}

async fn load_value<S, T>(storage: &S, key: &str) -> Result<Option<T>>
where
    S: StorageEffects + ?Sized,
    T: DeserializeOwned,
{
    match storage.retrieve(key).await? {
        Some(bytes) => decode(key, &bytes).map(Some),
        None => Ok(None),
    }
}

/// Read the full registry state from storage and check its integrity.
pub(crate) async fn load<S>(storage: &S) -> Result<StoredState>
where
    S: StorageEffects + ?Sized,
{
    let admin = load_value::<_, PrincipalId>(storage, ADMIN_KEY).await?;

    let mut researchers = BTreeMap::new();
    for key in storage.list_keys(Some(RESEARCHER_PREFIX)).await? {
        let Some(record) = load_value::<_, ResearcherRecord>(storage, &key).await? else {
            continue;
        };
        if key != researcher_key(&record.identity) {
            return Err(RegistryError::serialization(format!(
                "Record at {key} belongs to {}",
                record.identity
            )));
        }
        researchers.insert(record.identity.clone(), record);
    }

    let mut journal = Vec::new();
    for key in storage.list_keys(Some(JOURNAL_PREFIX)).await? {
        let Some(envelope) = load_value::<_, FactEnvelope>(storage, &key).await? else {
            continue;
        };
        let expected = journal.len() as u64 + 1;
        if envelope.sequence != expected || key != journal_key(expected) {
            return Err(RegistryError::serialization(format!(
                "Journal gap at {key}: expected sequence {expected}, found {}",
                envelope.sequence
            )));
        }
        journal.push(envelope);
    }

    tracing::debug!(
        researchers = researchers.len(),
        journal = journal.len(),
        has_admin = admin.is_some(),
        "Loaded registry state from storage"
    );

    Ok(StoredState {
        admin,
        researchers,
        journal,
    })
}
