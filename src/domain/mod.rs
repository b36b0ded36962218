//! # Domain Layer
//!
//! Entities, value objects, and validation rules with no I/O.
//!
//! - [`entities`]: The [`Person`](entities::Person) record
//! - [`value_objects`]: Identifiers, timestamps, and enums
//! - [`validation`]: Field rules applied before every write

pub mod entities;
pub mod validation;
pub mod value_objects;
