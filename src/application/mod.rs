//! # Application Layer
//!
//! Use cases over the domain and the repositories.

pub mod error;
pub mod services;
