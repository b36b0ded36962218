//! # Person Registration Service
//!
//! Runs the validator and then the repository for each CRUD operation, and
//! translates repository failures into [`ApplicationError`]s with the
//! user-facing messages both transports share.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::entities::Person;
use crate::domain::validation::{PersonInput, validate_now};
use crate::domain::value_objects::PersonId;
use crate::infrastructure::persistence::{BackendKind, PersonRepository, RepositoryError};
use std::sync::Arc;
use tracing::{error, info};

/// Message for a DNI conflict on create.
pub const DUPLICATE_ON_CREATE: &str = "El DNI ya está registrado";

/// Message for a DNI conflict on update.
pub const DUPLICATE_ON_UPDATE: &str = "El DNI ya está registrado en otro usuario";

/// Message for a missing record.
pub const NOT_FOUND: &str = "Usuario no encontrado";

/// Message returned after a successful delete.
pub const DELETED: &str = "Usuario eliminado correctamente";

/// CRUD use cases over one storage backend.
#[derive(Debug, Clone)]
pub struct PersonService {
    repository: Arc<dyn PersonRepository>,
}

impl PersonService {
    /// Creates a service over `repository`.
    #[must_use]
    pub fn new(repository: Arc<dyn PersonRepository>) -> Self {
        Self { repository }
    }

    /// Returns which backend this service writes to.
    #[must_use]
    pub fn backend(&self) -> BackendKind {
        self.repository.backend()
    }

    /// Lists every record.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Infrastructure` if the store fails.
    pub async fn list(&self) -> ApplicationResult<Vec<Person>> {
        self.repository
            .list()
            .await
            .map_err(|e| self.translate("list", e, DUPLICATE_ON_CREATE))
    }

    /// Looks a record up, returning `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Infrastructure` if the store fails.
    pub async fn find(&self, id: &PersonId) -> ApplicationResult<Option<Person>> {
        self.repository
            .get(id)
            .await
            .map_err(|e| self.translate("get", e, DUPLICATE_ON_CREATE))
    }

    /// Gets a record that must exist.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::NotFound` if no record has this id.
    pub async fn get(&self, id: &PersonId) -> ApplicationResult<Person> {
        self.find(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found(NOT_FOUND))
    }

    /// Validates `input` and registers a new person.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Validation` for invalid input and
    /// `ApplicationError::DuplicateKey` if the DNI is taken.
    pub async fn create(&self, input: &PersonInput) -> ApplicationResult<Person> {
        let data = validate_now(input)?;
        let person = self
            .repository
            .create(data)
            .await
            .map_err(|e| self.translate("create", e, DUPLICATE_ON_CREATE))?;

        info!(backend = %self.backend(), id = %person.id(), "person registered");
        Ok(person)
    }

    /// Validates `input` and replaces the record's fields.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Validation` for invalid input,
    /// `ApplicationError::DuplicateKey` if another record has the DNI and
    /// `ApplicationError::NotFound` if no record has this id.
    pub async fn update(&self, id: &PersonId, input: &PersonInput) -> ApplicationResult<Person> {
        let data = validate_now(input)?;
        let person = self
            .repository
            .update(id, data)
            .await
            .map_err(|e| self.translate("update", e, DUPLICATE_ON_UPDATE))?;

        info!(backend = %self.backend(), id = %person.id(), "person updated");
        Ok(person)
    }

    /// Removes a record and returns it.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::NotFound` if no record has this id.
    pub async fn delete(&self, id: &PersonId) -> ApplicationResult<Person> {
        let person = self
            .repository
            .delete(id)
            .await
            .map_err(|e| self.translate("delete", e, DUPLICATE_ON_CREATE))?;

        info!(backend = %self.backend(), id = %person.id(), "person deleted");
        Ok(person)
    }

    /// Counts the records in the store.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Infrastructure` if the store fails.
    pub async fn count(&self) -> ApplicationResult<u64> {
        self.repository
            .count()
            .await
            .map_err(|e| self.translate("count", e, DUPLICATE_ON_CREATE))
    }

    fn translate(
        &self,
        operation: &'static str,
        err: RepositoryError,
        duplicate_message: &str,
    ) -> ApplicationError {
        match err {
            RepositoryError::DuplicateKey { .. } => ApplicationError::duplicate_key(duplicate_message),
            RepositoryError::NotFound { .. } => ApplicationError::not_found(NOT_FOUND),
            other => {
                error!(backend = %self.backend(), operation, error = %other, "repository failure");
                ApplicationError::Infrastructure(other)
            }
        }
    }
}
