//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Identity Types
//!
//! - [`PersonId`]: Repository-assigned record identifier
//! - [`NationalId`]: Validated DNI, unique across records
//!
//! ## Other Types
//!
//! - [`Timestamp`]: Millisecond-precision UTC instant
//! - [`Gender`]: Recorded gender
//! - [`CITIES`]: City list offered by forms

pub mod enums;
pub mod ids;
pub mod national_id;
pub mod timestamp;

pub use enums::{CITIES, Gender, ParseEnumError};
pub use ids::PersonId;
pub use national_id::{InvalidNationalIdError, NationalId};
pub use timestamp::{ParseTimestampError, Timestamp};
