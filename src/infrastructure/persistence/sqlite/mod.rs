//! # SQLite Repositories
//!
//! Relational implementations backed by sqlx.

pub mod person_repository;

pub use person_repository::SqlitePersonRepository;
