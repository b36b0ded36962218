//! # Person Entity
//!
//! The registration record and its validated payload.
//!
//! [`PersonData`] holds the six client-supplied fields after validation;
//! [`Person`] adds the repository-assigned identity and timestamps.
//!
//! # Examples
//!
//! ```
//! use registro::domain::entities::Person;
//! use registro::domain::validation::{validate, PersonInput};
//! use registro::domain::value_objects::{PersonId, Timestamp};
//!
//! let input = PersonInput::new("0102030405", "Juan", "Garcia", "1990-01-01", "Masculino", "Quito");
//! let data = validate(&input, Timestamp::now()).unwrap();
//! let person = Person::register(PersonId::new("1"), data, Timestamp::now());
//!
//! assert_eq!(person.data().national_id().as_str(), "0102030405");
//! assert!(person.updated_at().is_none());
//! ```

use crate::domain::value_objects::{Gender, NationalId, PersonId, Timestamp};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The six mutable fields of a person, already validated.
///
/// Names and city are stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonData {
    national_id: NationalId,
    first_names: String,
    last_names: String,
    #[schemars(with = "String")]
    birth_date: Timestamp,
    gender: Gender,
    city: String,
}

impl PersonData {
    /// Assembles a payload from already-validated parts (for reconstruction from storage).
    #[must_use]
    pub fn from_parts(
        national_id: NationalId,
        first_names: impl Into<String>,
        last_names: impl Into<String>,
        birth_date: Timestamp,
        gender: Gender,
        city: impl Into<String>,
    ) -> Self {
        Self {
            national_id,
            first_names: first_names.into(),
            last_names: last_names.into(),
            birth_date,
            gender,
            city: city.into(),
        }
    }

    /// Returns the DNI.
    #[inline]
    #[must_use]
    pub fn national_id(&self) -> &NationalId {
        &self.national_id
    }

    /// Returns the first names.
    #[inline]
    #[must_use]
    pub fn first_names(&self) -> &str {
        &self.first_names
    }

    /// Returns the last names.
    #[inline]
    #[must_use]
    pub fn last_names(&self) -> &str {
        &self.last_names
    }

    /// Returns the birth date.
    #[inline]
    #[must_use]
    pub fn birth_date(&self) -> Timestamp {
        self.birth_date
    }

    /// Returns the gender.
    #[inline]
    #[must_use]
    pub fn gender(&self) -> Gender {
        self.gender
    }

    /// Returns the city.
    #[inline]
    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }
}

/// A registered person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    id: PersonId,
    #[serde(flatten)]
    data: PersonData,
    #[schemars(with = "String")]
    registered_at: Timestamp,
    #[schemars(with = "Option<String>")]
    updated_at: Option<Timestamp>,
}

impl Person {
    /// Creates a freshly registered person; `updated_at` starts unset.
    #[must_use]
    pub fn register(id: PersonId, data: PersonData, registered_at: Timestamp) -> Self {
        Self {
            id,
            data,
            registered_at,
            updated_at: None,
        }
    }

    /// Rebuilds a person from stored parts.
    #[must_use]
    pub fn from_parts(
        id: PersonId,
        data: PersonData,
        registered_at: Timestamp,
        updated_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            data,
            registered_at,
            updated_at,
        }
    }

    /// Replaces all mutable fields and stamps the update time.
    pub fn apply_update(&mut self, data: PersonData, at: Timestamp) {
        self.data = data;
        self.updated_at = Some(at);
    }

    // ========== Accessors ==========

    /// Returns the identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &PersonId {
        &self.id
    }

    /// Returns the validated fields.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &PersonData {
        &self.data
    }

    /// Returns the registration time.
    #[inline]
    #[must_use]
    pub fn registered_at(&self) -> Timestamp {
        self.registered_at
    }

    /// Returns the last update time, if the record was ever updated.
    #[inline]
    #[must_use]
    pub fn updated_at(&self) -> Option<Timestamp> {
        self.updated_at
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_data(dni: &str) -> PersonData {
        PersonData::from_parts(
            NationalId::parse(dni).unwrap(),
            "Juan Pedro",
            "Garcia Lopez",
            Timestamp::parse_iso("1990-01-01").unwrap(),
            Gender::Masculine,
            "Quito",
        )
    }

    #[test]
    fn register_leaves_updated_at_unset() {
        let now = Timestamp::now();
        let person = Person::register(PersonId::new("1"), sample_data("12345678"), now);
        assert_eq!(person.registered_at(), now);
        assert!(person.updated_at().is_none());
    }

    #[test]
    fn apply_update_replaces_fields_and_keeps_registration() {
        let registered = Timestamp::from_millis(1_000).unwrap();
        let mut person = Person::register(PersonId::new("1"), sample_data("12345678"), registered);
        let at = Timestamp::from_millis(2_000).unwrap();

        person.apply_update(sample_data("87654321"), at);

        assert_eq!(person.data().national_id().as_str(), "87654321");
        assert_eq!(person.registered_at(), registered);
        assert_eq!(person.updated_at(), Some(at));
    }

    #[test]
    fn json_shape_is_flat_camel_case() {
        let person = Person::register(
            PersonId::new("7"),
            sample_data("0102030405"),
            Timestamp::from_millis(0).unwrap(),
        );
        let json = serde_json::to_value(&person).unwrap();

        assert_eq!(json["id"], "7");
        assert_eq!(json["nationalId"], "0102030405");
        assert_eq!(json["firstNames"], "Juan Pedro");
        assert_eq!(json["lastNames"], "Garcia Lopez");
        assert_eq!(json["birthDate"], "1990-01-01T00:00:00.000Z");
        assert_eq!(json["gender"], "Masculino");
        assert_eq!(json["city"], "Quito");
        assert_eq!(json["registeredAt"], "1970-01-01T00:00:00.000Z");
        assert!(json["updatedAt"].is_null());

        let back: Person = serde_json::from_value(json).unwrap();
        assert_eq!(back, person);
    }
}
