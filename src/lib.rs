//! # registro
//!
//! Personal-data registration service.
//!
//! A person's DNI, names, birth date, gender and city are validated,
//! stored in one of several interchangeable backends (in-memory, SQLite,
//! MongoDB) and exposed over REST and GraphQL. A headless client models
//! the registration form on top of either API.
//!
//! # Layers
//!
//! - [`domain`]: entities, value objects and the validator
//! - [`application`]: use-case services and the error taxonomy
//! - [`infrastructure`]: repository port and storage adapters
//! - [`api`]: axum REST routes and the async-graphql schema
//! - [`client`]: form state and HTTP clients
//! - [`config`], [`telemetry`]: process setup

pub mod api;
pub mod application;
pub mod client;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod telemetry;
