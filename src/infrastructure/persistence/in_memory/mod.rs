//! # In-Memory Repositories
//!
//! In-memory implementations without database dependencies.
//!
//! ## Available Repositories
//!
//! - [`InMemoryPersonRepository`]: Person persistence
//!
//! ## Thread Safety
//!
//! Implementations use `Arc<RwLock<..>>` for thread-safe access; clones
//! share the same state.

pub mod person_repository;

pub use person_repository::InMemoryPersonRepository;
