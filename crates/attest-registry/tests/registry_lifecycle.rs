//! End-to-end registry behaviour: verification, reputation, admin transfer,
//! persistence across reopen, and all-or-nothing commits.

mod common;

use assert_matches::assert_matches;
use attest_core::{StorageBackend, StorageConfig};
use attest_effects::{FilesystemStorageHandler, LamportClockHandler, MemoryStorageHandler};
use attest_registry::{
    LogicalTime, RegistryConfig, RegistryError, RegistryFact, ReputationScore, ResearcherRegistry,
};
use common::*;
use std::sync::Arc;

#[tokio::test]
async fn full_admin_lifecycle_scenario() {
    let (registry, _) = memory_registry().await;
    let a = principal(ADMIN);
    let b = principal(OTHER);
    let c = principal(SUCCESSOR);
    let r = principal(RESEARCHER);

    registry
        .verify_researcher(&a, &r, "John Doe", "Security Research Inc")
        .await
        .unwrap();
    assert!(registry.is_verified(&r).await);

    let details = registry.researcher_details(&r).await.unwrap();
    assert_eq!(details.name, "John Doe");
    assert_eq!(details.organization, "Security Research Inc");
    assert_eq!(details.reputation_score.value(), 0);
    let t0 = details.verification_date;

    assert_matches!(
        registry.update_reputation(&b, &r, 150).await,
        Err(RegistryError::NotAuthorized { .. })
    );
    assert_eq!(registry.researcher_details(&r).await.unwrap().reputation_score.value(), 0);

    registry.update_reputation(&a, &r, 150).await.unwrap();
    assert_eq!(registry.researcher_details(&r).await.unwrap().reputation_score.value(), 150);

    registry.transfer_admin(&a, c.clone()).await.unwrap();
    assert_eq!(registry.admin().await, c);

    assert_matches!(
        registry.update_reputation(&a, &r, 200).await,
        Err(RegistryError::NotAuthorized { .. })
    );
    registry.update_reputation(&c, &r, 200).await.unwrap();

    let details = registry.researcher_details(&r).await.unwrap();
    assert_eq!(details.reputation_score.value(), 200);
    assert_eq!(details.verification_date, t0);

    // the former admin lost every gated write
    let late = principal("LATE-RESEARCHER");
    assert_matches!(
        registry.verify_researcher(&a, &late, "Late Name", "Late Org").await,
        Err(RegistryError::NotAuthorized { .. })
    );
    assert!(!registry.is_verified(&late).await);
    assert_matches!(
        registry.transfer_admin(&a, a.clone()).await,
        Err(RegistryError::NotAuthorized { .. })
    );
    assert_eq!(registry.admin().await, c);

    registry
        .verify_researcher(&c, &late, "Late Name", "Late Org")
        .await
        .unwrap();
    assert!(registry.is_verified(&late).await);
    assert!(registry.researcher_details(&late).await.unwrap().verification_date > t0);

    registry.transfer_admin(&c, b.clone()).await.unwrap();
    assert_eq!(registry.admin().await, b);
    assert!(!registry.is_admin(&c).await);
    assert_matches!(
        registry.update_reputation(&c, &r, 300).await,
        Err(RegistryError::NotAuthorized { .. })
    );
}

#[tokio::test]
async fn dotted_identities_work_on_filesystem_backend() {
    let dir = tempfile::TempDir::new().unwrap();
    let admin = principal(ADMIN);
    let registry = ResearcherRegistry::open(
        FilesystemStorageHandler::new(dir.path().to_path_buf()),
        LamportClockHandler::new(),
        &RegistryConfig::with_admin(admin.clone()),
    )
    .await
    .unwrap();

    assert_matches!(
        "..".parse::<attest_registry::PrincipalId>(),
        Err(RegistryError::InvalidArgument { .. })
    );

    for id in ["a.b", ".hidden", "dots..inside"] {
        let researcher = principal(id);
        registry
            .verify_researcher(&admin, &researcher, "Name", "Org")
            .await
            .unwrap();
        assert!(registry.is_verified(&researcher).await);
    }
    assert_eq!(registry.researcher_count().await, 3);
}

#[tokio::test]
async fn duplicate_verification_keeps_first_record() {
    let (registry, _) = memory_registry().await;
    let admin = principal(ADMIN);
    let r = principal(RESEARCHER);

    registry
        .verify_researcher(&admin, &r, "John Doe", "Security Research Inc")
        .await
        .unwrap();
    let first = registry.researcher_details(&r).await.unwrap();

    let second = registry
        .verify_researcher(&admin, &r, "Jane Roe", "Other Org")
        .await;
    assert_matches!(second, Err(RegistryError::AlreadyVerified { .. }));
    assert_eq!(second.unwrap_err().code(), 2);

    assert_eq!(registry.researcher_details(&r).await.unwrap(), first);
    assert_eq!(registry.researcher_count().await, 1);
}

#[tokio::test]
async fn rejected_writes_leave_storage_untouched() {
    let (registry, storage) = memory_registry().await;
    let admin = principal(ADMIN);
    let intruder = principal(OTHER);
    let r = principal(RESEARCHER);

    registry
        .verify_researcher(&admin, &r, "John Doe", "Security Research Inc")
        .await
        .unwrap();
    let before = storage_snapshot(&storage).await;
    let journal_before = registry.journal().await;

    let results = vec![
        registry
            .verify_researcher(&intruder, &principal("NEW-ONE"), "X", "Y")
            .await,
        registry.update_reputation(&intruder, &r, 10).await,
        registry.transfer_admin(&intruder, intruder.clone()).await,
        registry.update_reputation(&admin, &r, -3).await,
        registry.update_reputation(&admin, &r, 10_001).await,
        registry.update_reputation(&admin, &principal("UNKNOWN"), 3).await,
        registry.verify_researcher(&admin, &principal("NEW-TWO"), " ", "Org").await,
        registry.verify_researcher(&admin, &principal("NEW-THREE"), "Name", &"o".repeat(101)).await,
    ];

    let codes: Vec<u32> = results.into_iter().map(|r| r.unwrap_err().code()).collect();
    assert_eq!(codes, vec![1, 1, 1, 4, 4, 3, 4, 4]);

    assert_eq!(storage_snapshot(&storage).await, before);
    assert_eq!(registry.journal().await, journal_before);
    assert_eq!(registry.admin().await, admin);
}

#[tokio::test]
async fn journal_records_every_commit_in_order() {
    let (registry, _) = memory_registry().await;
    let admin = principal(ADMIN);
    let successor = principal(SUCCESSOR);
    let r = principal(RESEARCHER);

    registry
        .verify_researcher(&admin, &r, "John Doe", "Security Research Inc")
        .await
        .unwrap();
    registry.update_reputation(&admin, &r, 75).await.unwrap();
    registry.transfer_admin(&admin, successor.clone()).await.unwrap();

    let journal = registry.journal().await;
    assert_eq!(
        journal.iter().map(|f| f.sequence).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(journal.iter().all(|f| f.actor == admin));
    assert_eq!(
        journal[1].fact,
        RegistryFact::ReputationUpdated {
            researcher: r.clone(),
            previous: ReputationScore::INITIAL,
            current: ReputationScore::new(75, 10_000).unwrap(),
        }
    );
    assert_eq!(
        journal[2].fact,
        RegistryFact::AdminTransferred {
            previous: admin,
            current: successor,
        }
    );
    assert!(journal.windows(2).all(|w| w[0].recorded_at <= w[1].recorded_at));
}

#[tokio::test]
async fn reopen_restores_state_and_ignores_bootstrap() {
    let storage = MemoryStorageHandler::new();
    let admin = principal(ADMIN);
    let successor = principal(SUCCESSOR);
    let r = principal(RESEARCHER);
    let config = RegistryConfig::with_admin(admin.clone());

    {
        let registry = ResearcherRegistry::open(storage.clone(), LamportClockHandler::new(), &config)
            .await
            .unwrap();
        registry
            .verify_researcher(&admin, &r, "John Doe", "Security Research Inc")
            .await
            .unwrap();
        registry.update_reputation(&admin, &r, 42).await.unwrap();
        registry.transfer_admin(&admin, successor.clone()).await.unwrap();
    }

    let reopened = ResearcherRegistry::open(storage, LamportClockHandler::new(), &config)
        .await
        .unwrap();
    assert_eq!(reopened.admin().await, successor);
    assert!(!reopened.is_admin(&admin).await);
    assert_eq!(
        reopened.researcher_details(&r).await.unwrap().reputation_score.value(),
        42
    );
    assert_eq!(reopened.journal().await.len(), 3);

    reopened.update_reputation(&successor, &r, 43).await.unwrap();
    assert_eq!(reopened.journal().await.last().unwrap().sequence, 4);
}

#[tokio::test]
async fn filesystem_registry_survives_restart() {
    init_test_tracing();
    let dir = tempfile::TempDir::new().unwrap();
    let admin = principal(ADMIN);
    let r = principal(RESEARCHER);

    let mut config = RegistryConfig::with_admin(admin.clone());
    config.storage = StorageConfig {
        backend: StorageBackend::Filesystem,
        path: Some(dir.path().to_path_buf()),
    };

    {
        let registry = ResearcherRegistry::open_with_config(&config, LamportClockHandler::new())
            .await
            .unwrap();
        registry
            .verify_researcher(&admin, &r, "John Doe", "Security Research Inc")
            .await
            .unwrap();
        registry.update_reputation(&admin, &r, 150).await.unwrap();
    }

    let reopened = ResearcherRegistry::open(
        FilesystemStorageHandler::new(dir.path().to_path_buf()),
        LamportClockHandler::new(),
        &config,
    )
    .await
    .unwrap();

    let record = reopened.researcher_details(&r).await.unwrap();
    assert_eq!(record.name, "John Doe");
    assert_eq!(record.reputation_score.value(), 150);
    assert_eq!(record.verification_date, LogicalTime::new(1));
}

#[tokio::test]
async fn storage_failure_is_all_or_nothing() {
    init_test_tracing();
    let storage = FlakyStorage::default();
    let admin = principal(ADMIN);
    let r = principal(RESEARCHER);
    let registry = ResearcherRegistry::open(
        storage.clone(),
        LamportClockHandler::new(),
        &RegistryConfig::with_admin(admin.clone()),
    )
    .await
    .unwrap();

    registry
        .verify_researcher(&admin, &r, "John Doe", "Security Research Inc")
        .await
        .unwrap();

    storage.set_failing(true);
    assert_matches!(
        registry.update_reputation(&admin, &r, 99).await,
        Err(RegistryError::Storage { .. })
    );
    assert_matches!(
        registry.verify_researcher(&admin, &principal("R2"), "N", "O").await,
        Err(RegistryError::Storage { .. })
    );
    assert_matches!(
        registry.transfer_admin(&admin, principal(SUCCESSOR)).await,
        Err(RegistryError::Storage { .. })
    );

    assert_eq!(registry.researcher_details(&r).await.unwrap().reputation_score.value(), 0);
    assert!(!registry.is_verified(&principal("R2")).await);
    assert_eq!(registry.admin().await, admin);
    assert_eq!(registry.journal().await.len(), 1);

    storage.set_failing(false);
    registry.update_reputation(&admin, &r, 99).await.unwrap();
    assert_eq!(registry.journal().await.last().unwrap().sequence, 2);
}

#[tokio::test]
async fn concurrent_duplicate_verifications_admit_exactly_one() {
    let (registry, _) = memory_registry().await;
    let registry = Arc::new(registry);

    let mut handles = Vec::new();
    for i in 0..16 {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            registry
                .verify_researcher(
                    &principal(ADMIN),
                    &principal(RESEARCHER),
                    &format!("Name {i}"),
                    "Security Research Inc",
                )
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => successes += 1,
            Err(e) => assert_matches!(e, RegistryError::AlreadyVerified { .. }),
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(registry.journal().await.len(), 1);
}

#[tokio::test]
async fn shared_storage_handle_sees_committed_records() {
    let storage = Arc::new(MemoryStorageHandler::new());
    let admin = principal(ADMIN);
    let registry = ResearcherRegistry::open(
        Arc::clone(&storage),
        LamportClockHandler::new(),
        &RegistryConfig::with_admin(admin.clone()),
    )
    .await
    .unwrap();

    registry
        .verify_researcher(&admin, &principal(RESEARCHER), "John Doe", "Security Research Inc")
        .await
        .unwrap();

    // admin slot, one record, one journal entry
    assert_eq!(storage.len().await, 3);
}
