mod common;

use std::sync::Arc;

use common::{FakeExchanger, credential};
use mshard_auth::{
    CredentialConfig, CredentialError, CredentialPersistence, CredentialRegistry,
    MemoryCredentialPersistence,
};
use tokio_util::sync::CancellationToken;

fn configs() -> Vec<CredentialConfig> {
    vec![
        CredentialConfig::new("acc-a", credential("http://token/a")),
        CredentialConfig::new("acc-b", credential("http://token/b")),
    ]
}

#[test_log::test(tokio::test)]
async fn load_builds_one_manager_per_config() {
    let persistence = Arc::new(MemoryCredentialPersistence::new(configs()));
    let registry = CredentialRegistry::load(persistence, FakeExchanger::ok())
        .await
        .unwrap();

    let ids: Vec<String> = registry.list_all().into_iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["acc-a", "acc-b"]);
    let manager = registry.get_by_id("acc-b").unwrap();
    assert_eq!(manager.credential().await.token_endpoint, "http://token/b");

    let err = registry.get_by_id("acc-z").err().unwrap();
    assert_eq!(err, CredentialError::CredentialNotFound("acc-z".into()));
}

#[test_log::test(tokio::test)]
async fn successful_refresh_is_persisted() {
    let persistence = Arc::new(MemoryCredentialPersistence::new(configs()));
    let registry = CredentialRegistry::build_from_configs(
        configs(),
        persistence.clone(),
        FakeExchanger::ok(),
    )
    .unwrap();

    registry
        .get_by_id("acc-a")
        .unwrap()
        .refresh(&CancellationToken::new())
        .await
        .unwrap();

    let stored = persistence.get("acc-a").await.unwrap();
    assert_eq!(stored.credential.access_token, "access-1");
    assert_eq!(stored.credential.refresh_token, "refresh-1");
    let untouched = persistence.get("acc-b").await.unwrap();
    assert_eq!(untouched.credential.access_token, "old-access");
}

#[test_log::test(tokio::test)]
async fn failed_refresh_is_not_persisted() {
    let persistence = Arc::new(MemoryCredentialPersistence::new(configs()));
    let registry = CredentialRegistry::build_from_configs(
        configs(),
        persistence.clone(),
        FakeExchanger::failing(CredentialError::refresh_failed(Some(401), "revoked")),
    )
    .unwrap();

    let err = registry
        .get_by_id("acc-a")
        .unwrap()
        .refresh(&CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CredentialError::RefreshFailed { status: Some(401), .. }));
    let stored = persistence.get("acc-a").await.unwrap();
    assert_eq!(stored.credential.access_token, "old-access");
}

#[test_log::test(tokio::test)]
async fn duplicate_ids_are_rejected() {
    let mut duplicated = configs();
    duplicated.push(CredentialConfig::new("acc-a", credential("http://token/other")));
    let persistence = Arc::new(MemoryCredentialPersistence::new(vec![]));
    let err = CredentialRegistry::build_from_configs(duplicated, persistence, FakeExchanger::ok())
        .err()
        .unwrap();
    assert_eq!(err, CredentialError::DuplicateCredential("acc-a".into()));
}

#[test_log::test(tokio::test)]
async fn updating_unknown_id_fails() {
    let persistence = MemoryCredentialPersistence::new(configs());
    let err = persistence
        .update_by_id("nope", &credential("http://token"))
        .await
        .unwrap_err();
    assert_eq!(err, CredentialError::CredentialNotFound("nope".into()));
}
