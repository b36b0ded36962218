//! # MongoDB Repositories
//!
//! Document-store implementations, enabled with the `mongo` feature.

pub mod person_repository;

pub use person_repository::MongoPersonRepository;
