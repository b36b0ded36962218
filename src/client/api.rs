//! The [`PersonApi`] port used by the form controller.

use crate::client::error::ClientError;
use crate::domain::entities::Person;
use crate::domain::validation::PersonInput;
use crate::domain::value_objects::PersonId;
use async_trait::async_trait;
use std::fmt;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Remote CRUD over person records.
#[async_trait]
pub trait PersonApi: Send + Sync + fmt::Debug {
    /// Fetches every record.
    async fn list(&self) -> ClientResult<Vec<Person>>;

    /// Fetches one record.
    async fn get(&self, id: &PersonId) -> ClientResult<Person>;

    /// Registers a person.
    async fn create(&self, input: &PersonInput) -> ClientResult<Person>;

    /// Replaces a record's fields.
    async fn update(&self, id: &PersonId, input: &PersonInput) -> ClientResult<Person>;

    /// Deletes a record.
    async fn delete(&self, id: &PersonId) -> ClientResult<()>;
}
