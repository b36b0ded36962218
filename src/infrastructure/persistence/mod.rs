//! # Persistence Layer
//!
//! Person repository port and its storage adapters.
//!
//! ## Repository Trait (Port)
//!
//! - [`PersonRepository`]: CRUD over [`Person`](crate::domain::entities::Person)
//!   records with DNI uniqueness
//!
//! ## Implementations
//!
//! - `in_memory`: process-lifetime map, always available
//! - `sqlite`: relational table via sqlx
//! - `mongo`: document collection (feature `mongo`)
//!
//! [`factory`] builds any of them from [`StorageConfig`](crate::config::StorageConfig).

pub mod factory;
pub mod in_memory;
#[cfg(feature = "mongo")]
pub mod mongo;
pub mod sqlite;
pub mod traits;

#[cfg(test)]
pub(crate) mod contract;

pub use factory::{connect_backend, load_seed_file};
pub use in_memory::InMemoryPersonRepository;
#[cfg(feature = "mongo")]
pub use mongo::MongoPersonRepository;
pub use sqlite::SqlitePersonRepository;
pub use traits::{BackendKind, PersonRepository, RepositoryError, RepositoryResult};
