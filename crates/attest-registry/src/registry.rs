//! Researcher Registry
//!
//! Durable record-keeping for researcher verification and reputation. Every
//! write is funneled through the `AdminGate`, runs under an exclusive lock,
//! and commits in two steps: one storage batch (state change plus journal
//! fact), then an in-memory swap. A failure at any step returns an error and
//! leaves both storage and memory as they were.
//!
//! Gated writes check, in order: caller authorization, argument validity,
//! record existence.

use crate::gate::AdminGate;
use crate::layout;
use attest_core::effects::{LogicalClockEffects, StorageEffects};
use attest_core::{
    FactEnvelope, LogicalTime, PrincipalId, RegistryConfig, RegistryError, RegistryFact,
    RegistryLimits, ReputationScore, ResearcherRecord, Result, StorageBackend,
};
use attest_effects::{FilesystemStorageHandler, MemoryStorageHandler};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory mirror of everything the registry has committed
#[derive(Debug, Clone)]
struct RegistryState {
    gate: AdminGate,
    researchers: BTreeMap<PrincipalId, ResearcherRecord>,
    journal: Vec<FactEnvelope>,
    /// Highest logical time ever committed; stamps never go below it
    last_stamp: LogicalTime,
}

impl RegistryState {
    /// Verification stamp strictly after every stamp already committed.
    fn next_verification_stamp(&self, tick: LogicalTime) -> Result<LogicalTime> {
        let floor = self.last_stamp.value().checked_add(1).ok_or_else(|| {
            RegistryError::clock(format!("Logical time exhausted at {}", self.last_stamp))
        })?;
        Ok(tick.max(LogicalTime::new(floor)))
    }

    fn envelope(
        &self,
        actor: &PrincipalId,
        recorded_at: LogicalTime,
        fact: RegistryFact,
    ) -> FactEnvelope {
        FactEnvelope {
            sequence: self.journal.len() as u64 + 1,
            recorded_at,
            actor: actor.clone(),
            fact,
        }
    }
}

/// Admin-gated registry of verified researchers
pub struct ResearcherRegistry<S, C> {
    storage: S,
    clock: C,
    limits: RegistryLimits,
    state: RwLock<RegistryState>,
}

impl<S, C> std::fmt::Debug for ResearcherRegistry<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearcherRegistry")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl<C> ResearcherRegistry<Arc<dyn StorageEffects>, C>
where
    C: LogicalClockEffects,
{
    /// Validate `config`, build the configured storage backend and open the
    /// registry over it.
    pub async fn open_with_config(config: &RegistryConfig, clock: C) -> Result<Self> {
        config.validate()?;

        let storage: Arc<dyn StorageEffects> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(MemoryStorageHandler::new()),
            StorageBackend::Filesystem => {
                let path = config.storage.path.clone().ok_or_else(|| {
                    RegistryError::invalid("Filesystem storage requires a path")
                })?;
                Arc::new(FilesystemStorageHandler::new(path))
            }
        };

        Self::open(storage, clock, config).await
    }
}

impl<S, C> ResearcherRegistry<S, C>
where
    S: StorageEffects,
    C: LogicalClockEffects,
{
    /// Open the registry over existing storage.
    ///
    /// On empty storage the admin slot is seeded from
    /// `config.bootstrap_admin`; otherwise the stored admin wins and the
    /// bootstrap value is ignored.
    pub async fn open(storage: S, clock: C, config: &RegistryConfig) -> Result<Self> {
        let stored = layout::load(&storage).await?;

        let admin = match stored.admin {
            Some(admin) => {
                if let Some(bootstrap) = &config.bootstrap_admin {
                    if *bootstrap != admin {
                        tracing::debug!(%admin, %bootstrap, "Stored admin overrides bootstrap admin");
                    }
                }
                admin
            }
            None => {
                let admin = config.bootstrap_admin.clone().ok_or_else(|| {
                    RegistryError::invalid("Empty registry storage and no bootstrap admin configured")
                })?;
                storage
                    .store(layout::ADMIN_KEY, layout::encode(&admin)?)
                    .await?;
                tracing::info!(%admin, "Bootstrapped registry admin");
                admin
            }
        };

        let last_stamp = stored
            .researchers
            .values()
            .map(|r| r.verification_date)
            .chain(stored.journal.iter().map(|f| f.recorded_at))
            .max()
            .unwrap_or_default();

        tracing::info!(
            %admin,
            researchers = stored.researchers.len(),
            journal = stored.journal.len(),
            "Opened researcher registry"
        );

        Ok(Self {
            storage,
            clock,
            limits: config.limits.clone(),
            state: RwLock::new(RegistryState {
                gate: AdminGate::new(admin),
                researchers: stored.researchers,
                journal: stored.journal,
                last_stamp,
            }),
        })
    }

    /// Limits enforced by this registry
    pub fn limits(&self) -> &RegistryLimits {
        &self.limits
    }

    /// Current admin identity
    pub async fn admin(&self) -> PrincipalId {
        self.state.read().await.gate.admin().clone()
    }

    /// Whether `caller` is the current admin
    pub async fn is_admin(&self, caller: &PrincipalId) -> bool {
        self.state.read().await.gate.is_admin(caller)
    }

    /// Whether a record exists for `researcher`
    pub async fn is_verified(&self, researcher: &PrincipalId) -> bool {
        self.state.read().await.researchers.contains_key(researcher)
    }

    /// Full record for `researcher`
    pub async fn researcher_details(&self, researcher: &PrincipalId) -> Result<ResearcherRecord> {
        self.state
            .read()
            .await
            .researchers
            .get(researcher)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(format!("No record for researcher {researcher}")))
    }

    /// Number of verified researchers
    pub async fn researcher_count(&self) -> usize {
        self.state.read().await.researchers.len()
    }

    /// All records, ordered by identity
    pub async fn researchers(&self) -> Vec<ResearcherRecord> {
        self.state.read().await.researchers.values().cloned().collect()
    }

    /// Audit journal in commit order
    pub async fn journal(&self) -> Vec<FactEnvelope> {
        self.state.read().await.journal.clone()
    }

    /// Create a record for `researcher` with score 0.
    ///
    /// `name` and `organization` are stored with surrounding whitespace
    /// trimmed.
    pub async fn verify_researcher(
        &self,
        caller: &PrincipalId,
        researcher: &PrincipalId,
        name: &str,
        organization: &str,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state.gate.authorize(caller, "verify_researcher")?;

        let name = validate_text("name", name, self.limits.max_name_len)?;
        let organization =
            validate_text("organization", organization, self.limits.max_organization_len)?;

        if state.researchers.contains_key(researcher) {
            tracing::warn!(%researcher, "Rejected duplicate verification");
            return Err(RegistryError::already_verified(format!(
                "Researcher {researcher} is already verified"
            )));
        }

        let tick = self.clock.logical_advance().await?;
        let verification_date = state.next_verification_stamp(tick)?;
        let record = ResearcherRecord::new(
            researcher.clone(),
            name,
            organization,
            verification_date,
        );
        let envelope = state.envelope(
            caller,
            verification_date,
            RegistryFact::ResearcherVerified {
                researcher: researcher.clone(),
            },
        );

        self.commit(
            (layout::researcher_key(researcher), layout::encode(&record)?),
            &envelope,
        )
        .await?;

        state.researchers.insert(researcher.clone(), record);
        state.journal.push(envelope);
        state.last_stamp = verification_date;

        tracing::info!(%caller, %researcher, %verification_date, "Verified researcher");
        Ok(())
    }

    /// Replace the reputation score of `researcher` with `new_score`.
    ///
    /// The score is set absolutely; the last successful write wins.
    pub async fn update_reputation(
        &self,
        caller: &PrincipalId,
        researcher: &PrincipalId,
        new_score: i64,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state.gate.authorize(caller, "update_reputation")?;

        let score = ReputationScore::new(new_score, self.limits.max_reputation_score)?;

        let mut record = state.researchers.get(researcher).cloned().ok_or_else(|| {
            RegistryError::not_found(format!("No record for researcher {researcher}"))
        })?;
        let previous = record.reputation_score;
        record.reputation_score = score;

        let recorded_at = self.clock.logical_now().await?.max(state.last_stamp);
        let envelope = state.envelope(
            caller,
            recorded_at,
            RegistryFact::ReputationUpdated {
                researcher: researcher.clone(),
                previous,
                current: score,
            },
        );

        self.commit(
            (layout::researcher_key(researcher), layout::encode(&record)?),
            &envelope,
        )
        .await?;

        state.researchers.insert(researcher.clone(), record);
        state.journal.push(envelope);
        state.last_stamp = recorded_at;

        tracing::info!(%caller, %researcher, %previous, score = %score, "Updated reputation");
        Ok(())
    }

    /// Hand the admin role to `new_admin`.
    ///
    /// The previous admin loses all privileged access as soon as this
    /// returns `Ok`.
    pub async fn transfer_admin(&self, caller: &PrincipalId, new_admin: PrincipalId) -> Result<()> {
        let mut state = self.state.write().await;

        let mut gate = state.gate.clone();
        let previous = gate.transfer_admin(caller, new_admin.clone())?;

        let recorded_at = self.clock.logical_now().await?.max(state.last_stamp);
        let envelope = state.envelope(
            caller,
            recorded_at,
            RegistryFact::AdminTransferred {
                previous: previous.clone(),
                current: new_admin.clone(),
            },
        );

        self.commit(
            (layout::ADMIN_KEY.to_string(), layout::encode(&new_admin)?),
            &envelope,
        )
        .await?;

        state.gate = gate;
        state.journal.push(envelope);
        state.last_stamp = recorded_at;

        tracing::info!(%previous, current = %new_admin, "Transferred registry admin");
        Ok(())
    }

    /// Write one state entry and its journal fact in a single batch.
    async fn commit(&self, entry: (String, Vec<u8>), envelope: &FactEnvelope) -> Result<()> {
        let mut batch = HashMap::with_capacity(2);
        batch.insert(entry.0, entry.1);
        batch.insert(
            layout::journal_key(envelope.sequence),
            layout::encode(envelope)?,
        );

        self.storage.store_batch(batch).await.map_err(|e| {
            tracing::warn!(
                fact = envelope.fact.kind(),
                sequence = envelope.sequence,
                error = %e,
                "Registry commit failed"
            );
            RegistryError::from(e)
        })
    }
}

/// Trim and bound a required display string.
fn validate_text(field: &str, value: &str, max_len: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RegistryError::invalid(format!("{field} cannot be empty")));
    }
    if trimmed.chars().count() > max_len {
        return Err(RegistryError::invalid(format!(
            "{field} exceeds {max_len} characters"
        )));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(RegistryError::invalid(format!(
            "{field} contains control characters"
        )));
    }
    Ok(trimmed.to_string())
}
