//! Behavioural checks shared by every [`PersonRepository`] implementation.
//!
//! Each backend's test module calls these against a fresh, empty store.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::domain::entities::PersonData;
use crate::domain::validation::{PersonInput, validate};
use crate::domain::value_objects::{PersonId, Timestamp};
use crate::infrastructure::persistence::traits::PersonRepository;

pub(crate) fn data(dni: &str, first_names: &str) -> PersonData {
    let input = PersonInput::new(
        dni,
        first_names,
        "Garcia Lopez",
        "1990-01-01",
        "Masculino",
        "Quito",
    );
    validate(&input, Timestamp::now()).expect("fixture must be valid")
}

pub(crate) async fn create_then_get_round_trips(repo: &dyn PersonRepository) {
    let created = repo.create(data("0102030405", "Juan Pedro")).await.unwrap();

    assert!(!created.id().as_str().is_empty());
    assert!(created.updated_at().is_none());
    assert!(!created.registered_at().is_after(&Timestamp::now()));

    let fetched = repo.get(created.id()).await.unwrap().unwrap();
    assert_eq!(fetched, created);
}

pub(crate) async fn list_is_idempotent(repo: &dyn PersonRepository) {
    repo.create(data("11111111", "Ana")).await.unwrap();
    repo.create(data("22222222", "Luis")).await.unwrap();

    let mut first = repo.list().await.unwrap();
    let mut second = repo.list().await.unwrap();
    first.sort_by(|a, b| a.id().cmp(b.id()));
    second.sort_by(|a, b| a.id().cmp(b.id()));

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
    assert_eq!(repo.count().await.unwrap(), 2);
}

pub(crate) async fn duplicate_create_is_rejected(repo: &dyn PersonRepository) {
    repo.create(data("0102030405", "Juan")).await.unwrap();

    let err = repo.create(data("0102030405", "Pedro")).await.unwrap_err();
    assert!(err.is_duplicate_key(), "unexpected error: {err}");

    let matching = repo
        .list()
        .await
        .unwrap()
        .into_iter()
        .filter(|p| p.data().national_id().as_str() == "0102030405")
        .count();
    assert_eq!(matching, 1);
}

pub(crate) async fn update_checks_uniqueness_against_others(repo: &dyn PersonRepository) {
    let a = repo.create(data("11111111", "Ana")).await.unwrap();
    let b = repo.create(data("22222222", "Luis")).await.unwrap();

    let err = repo
        .update(a.id(), data("22222222", "Ana"))
        .await
        .unwrap_err();
    assert!(err.is_duplicate_key(), "unexpected error: {err}");

    let unchanged = repo.get(a.id()).await.unwrap().unwrap();
    assert_eq!(unchanged, a);

    let updated = repo
        .update(a.id(), data("11111111", "Ana Maria"))
        .await
        .unwrap();
    assert_eq!(updated.id(), a.id());
    assert_eq!(updated.data().first_names(), "Ana Maria");
    assert_eq!(updated.registered_at(), a.registered_at());
    assert!(updated.updated_at().is_some());

    let fetched = repo.get(a.id()).await.unwrap().unwrap();
    assert_eq!(fetched, updated);
    assert_eq!(repo.get(b.id()).await.unwrap().unwrap(), b);
}

pub(crate) async fn update_missing_is_not_found(repo: &dyn PersonRepository) {
    let err = repo
        .update(&PersonId::new("999999"), data("33333333", "Eva"))
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
    assert_eq!(repo.count().await.unwrap(), 0);
}

pub(crate) async fn delete_returns_removed_record(repo: &dyn PersonRepository) {
    let created = repo.create(data("44444444", "Rosa")).await.unwrap();

    let removed = repo.delete(created.id()).await.unwrap();
    assert_eq!(removed, created);
    assert!(repo.get(created.id()).await.unwrap().is_none());
    assert_eq!(repo.count().await.unwrap(), 0);
}

pub(crate) async fn delete_missing_leaves_store_unchanged(repo: &dyn PersonRepository) {
    let created = repo.create(data("55555555", "Mario")).await.unwrap();

    let err = repo.delete(&PersonId::new("999999")).await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");

    let all = repo.list().await.unwrap();
    assert_eq!(all, vec![created]);
}

pub(crate) async fn malformed_ids_are_not_found(repo: &dyn PersonRepository) {
    let id = PersonId::new("not-an-id");
    assert!(repo.get(&id).await.unwrap().is_none());
    assert!(repo.delete(&id).await.unwrap_err().is_not_found());
}

/// Runs the whole suite, building a fresh store for each check.
macro_rules! person_repository_contract {
    ($make:expr) => {
        #[tokio::test]
        async fn contract_create_then_get_round_trips() {
            let repo = $make;
            $crate::infrastructure::persistence::contract::create_then_get_round_trips(&repo).await;
        }

        #[tokio::test]
        async fn contract_list_is_idempotent() {
            let repo = $make;
            $crate::infrastructure::persistence::contract::list_is_idempotent(&repo).await;
        }

        #[tokio::test]
        async fn contract_duplicate_create_is_rejected() {
            let repo = $make;
            $crate::infrastructure::persistence::contract::duplicate_create_is_rejected(&repo)
                .await;
        }

        #[tokio::test]
        async fn contract_update_checks_uniqueness_against_others() {
            let repo = $make;
            $crate::infrastructure::persistence::contract::update_checks_uniqueness_against_others(
                &repo,
            )
            .await;
        }

        #[tokio::test]
        async fn contract_update_missing_is_not_found() {
            let repo = $make;
            $crate::infrastructure::persistence::contract::update_missing_is_not_found(&repo)
                .await;
        }

        #[tokio::test]
        async fn contract_delete_returns_removed_record() {
            let repo = $make;
            $crate::infrastructure::persistence::contract::delete_returns_removed_record(&repo)
                .await;
        }

        #[tokio::test]
        async fn contract_delete_missing_leaves_store_unchanged() {
            let repo = $make;
            $crate::infrastructure::persistence::contract::delete_missing_leaves_store_unchanged(
                &repo,
            )
            .await;
        }

        #[tokio::test]
        async fn contract_malformed_ids_are_not_found() {
            let repo = $make;
            $crate::infrastructure::persistence::contract::malformed_ids_are_not_found(&repo)
                .await;
        }
    };
}

pub(crate) use person_repository_contract;
