//! # Domain Entities
//!
//! - [`Person`]: A registered person
//! - [`PersonData`]: The validated, client-supplied fields of a person

pub mod person;

pub use person::{Person, PersonData};
