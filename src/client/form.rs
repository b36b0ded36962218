//! # Registration Form
//!
//! Headless state of the registration form: six raw text fields and the
//! per-field error messages currently shown next to them.

use crate::domain::entities::{Person, PersonData};
use crate::domain::validation::{Field, PersonInput, ValidationErrors, validate};
use crate::domain::value_objects::Timestamp;
use std::collections::BTreeMap;

/// Form draft with its visible errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    national_id: String,
    first_names: String,
    last_names: String,
    birth_date: String,
    gender: String,
    city: String,
    errors: ValidationErrors,
}

impl RegistrationForm {
    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::NationalId => &mut self.national_id,
            Field::FirstNames => &mut self.first_names,
            Field::LastNames => &mut self.last_names,
            Field::BirthDate => &mut self.birth_date,
            Field::Gender => &mut self.gender,
            Field::City => &mut self.city,
        }
    }

    /// Returns the raw text of a field.
    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::NationalId => &self.national_id,
            Field::FirstNames => &self.first_names,
            Field::LastNames => &self.last_names,
            Field::BirthDate => &self.birth_date,
            Field::Gender => &self.gender,
            Field::City => &self.city,
        }
    }

    /// Sets a field and clears its error.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        *self.slot_mut(field) = value.into();
        self.errors.remove(field);
    }

    /// Returns the visible errors.
    #[must_use]
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Returns the error shown for `field`, if any.
    #[must_use]
    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(field)
    }

    /// Returns the draft as a submission.
    #[must_use]
    pub fn to_input(&self) -> PersonInput {
        PersonInput::new(
            &self.national_id,
            &self.first_names,
            &self.last_names,
            &self.birth_date,
            &self.gender,
            &self.city,
        )
    }

    /// Runs the validator against `now`, replacing the visible errors.
    ///
    /// # Errors
    ///
    /// Returns the field errors if any rule fails.
    pub fn validate(&mut self, now: Timestamp) -> Result<PersonData, ValidationErrors> {
        match validate(&self.to_input(), now) {
            Ok(data) => {
                self.errors = ValidationErrors::new();
                Ok(data)
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }

    /// Shows field errors reported by the server. Unknown field names are ignored.
    pub fn apply_server_errors(&mut self, fields: &BTreeMap<String, String>) {
        for field in Field::ALL {
            if let Some(message) = fields.get(field.as_str()) {
                self.errors.insert(field, message.clone());
            }
        }
    }

    /// Loads a stored record for editing. The birth date is shown as `YYYY-MM-DD`.
    pub fn fill_from(&mut self, person: &Person) {
        let data = person.data();
        self.national_id = data.national_id().to_string();
        self.first_names = data.first_names().to_string();
        self.last_names = data.last_names().to_string();
        self.birth_date = data.birth_date().to_date_string();
        self.gender = data.gender().to_string();
        self.city = data.city().to_string();
        self.errors = ValidationErrors::new();
    }

    /// Clears every field and error.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns true if no field has text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        Field::ALL.iter().all(|f| self.value(*f).is_empty())
    }
}
