//! # In-Memory Person Repository
//!
//! In-memory implementation of [`PersonRepository`].
//!
//! State lives for the lifetime of the value (and its clones); identifiers
//! are sequential integers starting at 1. The DNI uniqueness check and the
//! write happen under the same write guard, so concurrent creates cannot
//! both pass the check.

use crate::domain::entities::{Person, PersonData};
use crate::domain::value_objects::{PersonId, Timestamp};
use crate::infrastructure::persistence::traits::{
    BackendKind, PersonRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug)]
struct Store {
    records: BTreeMap<i64, Person>,
    next_id: i64,
}

impl Store {
    fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn national_id_taken(&self, data: &PersonData, except: Option<i64>) -> bool {
        self.records.iter().any(|(key, person)| {
            Some(*key) != except && person.data().national_id() == data.national_id()
        })
    }

    fn insert(&mut self, data: PersonData) -> RepositoryResult<Person> {
        if self.national_id_taken(&data, None) {
            return Err(RepositoryError::duplicate_national_id(
                data.national_id().as_str(),
            ));
        }
        let key = self.next_id;
        self.next_id += 1;
        let person = Person::register(PersonId::from_integer(key), data, Timestamp::now());
        self.records.insert(key, person.clone());
        Ok(person)
    }
}

/// In-memory implementation of [`PersonRepository`].
///
/// Uses a `BTreeMap` keyed by the integer id behind a tokio `RwLock`, so
/// listing returns records in creation order.
#[derive(Debug, Clone)]
pub struct InMemoryPersonRepository {
    storage: Arc<RwLock<Store>>,
}

impl InMemoryPersonRepository {
    /// Creates a new empty in-memory person repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(Store::new())),
        }
    }

    /// Creates a repository pre-populated with seed records.
    ///
    /// Records whose DNI repeats an earlier seed are skipped with a warning.
    #[must_use]
    pub fn seeded(seed: impl IntoIterator<Item = PersonData>) -> Self {
        let mut store = Store::new();
        for data in seed {
            let dni = data.national_id().to_string();
            if let Err(err) = store.insert(data) {
                warn!(national_id = %dni, error = %err, "skipping seed record");
            }
        }
        Self {
            storage: Arc::new(RwLock::new(store)),
        }
    }

    /// Clears all records. The id counter is not reset.
    pub async fn clear(&self) {
        let mut storage = self.storage.write().await;
        storage.records.clear();
    }
}

impl Default for InMemoryPersonRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersonRepository for InMemoryPersonRepository {
    fn backend(&self) -> BackendKind {
        BackendKind::Memory
    }

    async fn list(&self) -> RepositoryResult<Vec<Person>> {
        let storage = self.storage.read().await;
        Ok(storage.records.values().cloned().collect())
    }

    async fn get(&self, id: &PersonId) -> RepositoryResult<Option<Person>> {
        let Some(key) = id.as_integer() else {
            return Ok(None);
        };
        let storage = self.storage.read().await;
        Ok(storage.records.get(&key).cloned())
    }

    async fn create(&self, data: PersonData) -> RepositoryResult<Person> {
        let mut storage = self.storage.write().await;
        let person = storage.insert(data)?;
        debug!(id = %person.id(), "person created in memory");
        Ok(person)
    }

    async fn update(&self, id: &PersonId, data: PersonData) -> RepositoryResult<Person> {
        let key = id.as_integer();
        let mut storage = self.storage.write().await;

        if storage.national_id_taken(&data, key) {
            return Err(RepositoryError::duplicate_national_id(
                data.national_id().as_str(),
            ));
        }

        let person = key
            .and_then(|key| storage.records.get_mut(&key))
            .ok_or_else(|| RepositoryError::not_found(id))?;
        person.apply_update(data, Timestamp::now());
        debug!(id = %id, "person updated in memory");
        Ok(person.clone())
    }

    async fn delete(&self, id: &PersonId) -> RepositoryResult<Person> {
        let mut storage = self.storage.write().await;
        id.as_integer()
            .and_then(|key| storage.records.remove(&key))
            .ok_or_else(|| RepositoryError::not_found(id))
    }

    async fn count(&self) -> RepositoryResult<u64> {
        let storage = self.storage.read().await;
        Ok(storage.records.len() as u64)
    }
}
