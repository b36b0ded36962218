//! # Repository Traits
//!
//! Port definitions for persistence abstraction.
//!
//! [`PersonRepository`] abstracts the storage of [`Person`] records so the
//! application layer works identically over every backend:
//!
//! - `in_memory`: process-lifetime map, ids restart at 1
//! - `sqlite`: relational table with a `UNIQUE` DNI column
//! - `mongo`: document collection with a unique DNI index
//!
//! # Examples
//!
//! ```ignore
//! use registro::infrastructure::persistence::traits::PersonRepository;
//!
//! async fn print_all(repo: &impl PersonRepository) {
//!     for person in repo.list().await.unwrap() {
//!         println!("{} {}", person.id(), person.data().national_id());
//!     }
//! }
//! ```

use crate::domain::entities::{Person, PersonData};
use crate::domain::value_objects::PersonId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Entity name used in repository errors.
pub const PERSON_ENTITY: &str = "Person";

/// Field name reported by DNI uniqueness violations.
pub const NATIONAL_ID_FIELD: &str = "nationalId";

/// Error type for repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Entity not found.
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// Unique-key violation.
    #[error("Duplicate key: {field} '{value}' already exists")]
    DuplicateKey {
        /// Name of the unique field.
        field: &'static str,
        /// Conflicting value.
        value: String,
    },

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query error.
    #[error("Query error: {0}")]
    Query(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepositoryError {
    /// Creates a not found error for a person.
    #[must_use]
    pub fn not_found(id: &PersonId) -> Self {
        Self::NotFound {
            entity_type: PERSON_ENTITY,
            id: id.to_string(),
        }
    }

    /// Creates a DNI uniqueness violation.
    #[must_use]
    pub fn duplicate_national_id(value: impl Into<String>) -> Self {
        Self::DuplicateKey {
            field: NATIONAL_ID_FIELD,
            value: value.into(),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error.
    #[must_use]
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Returns true if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this is a unique-key violation.
    #[must_use]
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Storage backend kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Process-lifetime in-memory map.
    Memory,
    /// SQLite table via sqlx.
    Sqlite,
    /// MongoDB collection.
    Mongo,
}

impl BackendKind {
    /// Returns the route segment / configuration name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite => "sqlite",
            Self::Mongo => "mongo",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "in_memory" | "mem" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            "mongo" | "mongodb" => Ok(Self::Mongo),
            other => Err(format!("unknown backend '{other}'")),
        }
    }
}

/// Repository for person records.
///
/// Implementations must check DNI uniqueness before every write and back
/// that check with a storage-level constraint, so a concurrent writer that
/// slips past the pre-check still fails with
/// [`RepositoryError::DuplicateKey`].
#[async_trait]
pub trait PersonRepository: Send + Sync + fmt::Debug {
    /// Returns which backend this is.
    fn backend(&self) -> BackendKind;

    /// Returns all records. No ordering is guaranteed.
    async fn list(&self) -> RepositoryResult<Vec<Person>>;

    /// Gets a record by ID.
    ///
    /// Returns `None` if the record does not exist or the id is not valid
    /// for this store.
    async fn get(&self, id: &PersonId) -> RepositoryResult<Option<Person>>;

    /// Stores a new record, assigning its id and registration time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DuplicateKey` if another record has the same
    /// DNI; nothing is written in that case.
    async fn create(&self, data: PersonData) -> RepositoryResult<Person>;

    /// Replaces the fields of an existing record and stamps its update time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DuplicateKey` if a record with a different id
    /// has the same DNI (checked first), or `RepositoryError::NotFound` if no
    /// record has this id.
    async fn update(&self, id: &PersonId, data: PersonData) -> RepositoryResult<Person>;

    /// Removes a record and returns it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no record has this id.
    async fn delete(&self, id: &PersonId) -> RepositoryResult<Person>;

    /// Counts all records.
    async fn count(&self) -> RepositoryResult<u64>;
}
