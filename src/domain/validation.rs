//! # Validation
//!
//! Field rules applied to every submitted person before any write.
//!
//! [`validate`] is pure: it takes the raw submission and the reference
//! instant, and returns either the typed [`PersonData`] or a map from field
//! name to a human-readable message. Malformed input is never an error of
//! its own, it is reported as a failure of the affected field.
//!
//! # Rules
//!
//! | Field        | Rule                                                        |
//! |--------------|-------------------------------------------------------------|
//! | `nationalId` | required, `^[0-9]{8,10}$`                                   |
//! | `firstNames` | required, at least 2 characters after trimming              |
//! | `lastNames`  | required, at least 2 characters after trimming              |
//! | `birthDate`  | required, ISO-8601 date, strictly before the reference time |
//! | `gender`     | required, Masculino / Femenino / Otro (any casing)          |
//! | `city`       | required after trimming                                     |
//!
//! # Examples
//!
//! ```
//! use registro::domain::validation::{validate, Field, PersonInput};
//! use registro::domain::value_objects::Timestamp;
//!
//! let mut input = PersonInput::new("123", "Juan", "Garcia", "1990-01-01", "Masculino", "Quito");
//! let errors = validate(&input, Timestamp::now()).unwrap_err();
//! assert!(errors.get(Field::NationalId).is_some());
//!
//! input.national_id = Some("12345678".to_string());
//! assert!(validate(&input, Timestamp::now()).is_ok());
//! ```

use crate::domain::entities::PersonData;
use crate::domain::value_objects::{Gender, NationalId, Timestamp};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Minimum number of characters for names after trimming.
pub const MIN_NAME_CHARS: usize = 2;

/// Raw person submission, as received from a client.
///
/// Every field is optional so that missing values surface as validation
/// messages rather than decoding failures. The legacy Spanish field names
/// are accepted as aliases. JSON numbers are taken as their decimal text;
/// any other non-string value marks the field as malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonInput {
    /// DNI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    /// First names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_names: Option<String>,
    /// Last names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_names: Option<String>,
    /// Birth date, ISO-8601.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    /// Gender label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// City.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip)]
    malformed: BTreeSet<Field>,
}

/// Wire shape of a submission before field values are coerced to text.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawPersonInput {
    #[serde(alias = "dni")]
    national_id: Option<Value>,
    #[serde(alias = "nombres")]
    first_names: Option<Value>,
    #[serde(alias = "apellidos")]
    last_names: Option<Value>,
    #[serde(alias = "fechaNacimiento")]
    birth_date: Option<Value>,
    #[serde(alias = "genero")]
    gender: Option<Value>,
    #[serde(alias = "ciudad")]
    city: Option<Value>,
}

impl<'de> Deserialize<'de> for PersonInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        RawPersonInput::deserialize(deserializer).map(Self::from)
    }
}

impl From<RawPersonInput> for PersonInput {
    fn from(raw: RawPersonInput) -> Self {
        let mut malformed = BTreeSet::new();
        let mut text = |field: Field, value: Option<Value>| match value {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(_) => {
                malformed.insert(field);
                None
            }
        };

        let national_id = text(Field::NationalId, raw.national_id);
        let first_names = text(Field::FirstNames, raw.first_names);
        let last_names = text(Field::LastNames, raw.last_names);
        let birth_date = text(Field::BirthDate, raw.birth_date);
        let gender = text(Field::Gender, raw.gender);
        let city = text(Field::City, raw.city);

        Self {
            national_id,
            first_names,
            last_names,
            birth_date,
            gender,
            city,
            malformed,
        }
    }
}

impl PersonInput {
    /// Builds a submission with every field present.
    #[must_use]
    pub fn new(
        national_id: impl Into<String>,
        first_names: impl Into<String>,
        last_names: impl Into<String>,
        birth_date: impl Into<String>,
        gender: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            national_id: Some(national_id.into()),
            first_names: Some(first_names.into()),
            last_names: Some(last_names.into()),
            birth_date: Some(birth_date.into()),
            gender: Some(gender.into()),
            city: Some(city.into()),
            malformed: BTreeSet::new(),
        }
    }

    /// Returns true if the field arrived with a value that is neither text,
    /// a number, nor null.
    #[must_use]
    pub fn is_malformed(&self, field: Field) -> bool {
        self.malformed.contains(&field)
    }
}

impl From<&PersonData> for PersonInput {
    fn from(data: &PersonData) -> Self {
        Self::new(
            data.national_id().as_str(),
            data.first_names(),
            data.last_names(),
            data.birth_date().to_iso_string(),
            data.gender().as_str(),
            data.city(),
        )
    }
}

/// The validated fields, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// `nationalId`
    NationalId,
    /// `firstNames`
    FirstNames,
    /// `lastNames`
    LastNames,
    /// `birthDate`
    BirthDate,
    /// `gender`
    Gender,
    /// `city`
    City,
}

impl Field {
    /// All fields in reporting order.
    pub const ALL: [Field; 6] = [
        Self::NationalId,
        Self::FirstNames,
        Self::LastNames,
        Self::BirthDate,
        Self::Gender,
        Self::City,
    ];

    /// Returns the wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NationalId => "nationalId",
            Self::FirstNames => "firstNames",
            Self::LastNames => "lastNames",
            Self::BirthDate => "birthDate",
            Self::Gender => "gender",
            Self::City => "city",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field validation messages.
///
/// Never empty when returned from [`validate`]. Displays as the message of
/// the first failing field in reporting order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    /// Creates an empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for a field, replacing any previous one.
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Removes the message for a field.
    pub fn remove(&mut self, field: Field) {
        self.0.remove(&field);
    }

    /// Returns the message for a field.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Returns true if no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the message of the first failing field.
    #[must_use]
    pub fn first_message(&self) -> Option<&str> {
        self.0.values().next().map(String::as_str)
    }

    /// Iterates over failing fields in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.first_message().unwrap_or("datos inválidos"))
    }
}

impl std::error::Error for ValidationErrors {}

/// Validates a submission against the reference instant `now`.
///
/// # Errors
///
/// Returns [`ValidationErrors`] with one message per failing field.
pub fn validate(input: &PersonInput, now: Timestamp) -> Result<PersonData, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let national_id = match present(&input.national_id) {
        None => {
            errors.insert(Field::NationalId, "El DNI es obligatorio");
            None
        }
        Some(_) => {
            let raw = input.national_id.as_deref().unwrap_or_default();
            match NationalId::parse(raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.insert(Field::NationalId, "El DNI debe tener entre 8 y 10 dígitos");
                    None
                }
            }
        }
    };

    let first_names = names(
        &input.first_names,
        Field::FirstNames,
        "Los nombres son obligatorios",
        "Los nombres deben tener al menos 2 caracteres",
        &mut errors,
    );
    let last_names = names(
        &input.last_names,
        Field::LastNames,
        "Los apellidos son obligatorios",
        "Los apellidos deben tener al menos 2 caracteres",
        &mut errors,
    );

    let birth_date = match present(&input.birth_date) {
        None => {
            errors.insert(Field::BirthDate, "La fecha de nacimiento es obligatoria");
            None
        }
        Some(raw) => match Timestamp::parse_iso(raw) {
            Err(_) => {
                errors.insert(Field::BirthDate, "La fecha de nacimiento no es válida");
                None
            }
            Ok(date) if !date.is_before(&now) => {
                errors.insert(
                    Field::BirthDate,
                    "La fecha de nacimiento debe ser anterior a hoy",
                );
                None
            }
            Ok(date) => Some(date),
        },
    };

    let gender = match present(&input.gender) {
        None => {
            errors.insert(Field::Gender, "Debe seleccionar un género");
            None
        }
        Some(raw) => match raw.parse::<Gender>() {
            Ok(gender) => Some(gender),
            Err(_) => {
                errors.insert(Field::Gender, "El género debe ser Masculino, Femenino u Otro");
                None
            }
        },
    };

    let city = match present(&input.city) {
        None => {
            errors.insert(Field::City, "Debe seleccionar una ciudad");
            None
        }
        Some(raw) => Some(raw.to_string()),
    };

    for field in &input.malformed {
        errors.insert(*field, malformed_message(*field));
    }

    match (national_id, first_names, last_names, birth_date, gender, city) {
        (Some(national_id), Some(first), Some(last), Some(birth), Some(gender), Some(city))
            if errors.is_empty() =>
        {
            Ok(PersonData::from_parts(
                national_id,
                first,
                last,
                birth,
                gender,
                city,
            ))
        }
        _ => Err(errors),
    }
}

/// Message for a field whose value had the wrong type.
fn malformed_message(field: Field) -> &'static str {
    match field {
        Field::NationalId => "El DNI debe tener entre 8 y 10 dígitos",
        Field::FirstNames => "Los nombres deben ser texto",
        Field::LastNames => "Los apellidos deben ser texto",
        Field::BirthDate => "La fecha de nacimiento no es válida",
        Field::Gender => "El género debe ser Masculino, Femenino u Otro",
        Field::City => "La ciudad debe ser texto",
    }
}

/// Validates a submission against the current instant.
///
/// # Errors
///
/// Returns [`ValidationErrors`] with one message per failing field.
pub fn validate_now(input: &PersonInput) -> Result<PersonData, ValidationErrors> {
    validate(input, Timestamp::now())
}

/// Returns the trimmed value when it is non-blank.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn names(
    value: &Option<String>,
    field: Field,
    required: &str,
    too_short: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match present(value) {
        None => {
            errors.insert(field, required);
            None
        }
        Some(trimmed) if trimmed.chars().count() < MIN_NAME_CHARS => {
            errors.insert(field, too_short);
            None
        }
        Some(trimmed) => Some(trimmed.to_string()),
    }
}
