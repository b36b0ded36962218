//! # Domain Enums
//!
//! Enumeration types for domain concepts.
//!
//! - [`Gender`] - Gender recorded on a registration
//! - [`CITIES`] - Cities offered by registration forms
//!
//! Enums implement `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`,
//! `Display`, `FromStr`, and Serde traits.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cities offered by the registration form.
///
/// Forms restrict input to this list; the server only requires a non-empty
/// city and accepts any value.
pub const CITIES: [&str; 10] = [
    "Guayaquil",
    "Quito",
    "Cuenca",
    "Santo Domingo",
    "Machala",
    "Durán",
    "Manta",
    "Portoviejo",
    "Loja",
    "Ambato",
];

/// Gender recorded on a registration.
///
/// The canonical wire form is the capitalised Spanish word. Parsing is
/// case-insensitive and also accepts the English names.
///
/// # Examples
///
/// ```
/// use registro::domain::value_objects::enums::Gender;
///
/// let gender: Gender = "masculino".parse().unwrap();
/// assert_eq!(gender, Gender::Masculine);
/// assert_eq!(gender.to_string(), "Masculino");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[repr(u8)]
pub enum Gender {
    /// Masculino.
    #[serde(rename = "Masculino", alias = "masculino")]
    Masculine = 0,
    /// Femenino.
    #[serde(rename = "Femenino", alias = "femenino")]
    Feminine = 1,
    /// Otro.
    #[serde(rename = "Otro", alias = "otro")]
    Other = 2,
}

impl Gender {
    /// All variants in display order.
    pub const ALL: [Gender; 3] = [Self::Masculine, Self::Feminine, Self::Other];

    /// Returns the canonical wire label.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Masculine => "Masculino",
            Self::Feminine => "Femenino",
            Self::Other => "Otro",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "masculino" | "masculine" => Ok(Self::Masculine),
            "femenino" | "feminine" => Ok(Self::Feminine),
            "otro" | "other" => Ok(Self::Other),
            _ => Err(ParseEnumError::InvalidValue("Gender", s.to_string())),
        }
    }
}

/// Error returned when parsing an enum from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEnumError {
    /// The provided string value is not valid for the enum.
    InvalidValue(&'static str, String),
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue(enum_name, value) => {
                write!(f, "invalid {} value: '{}'", enum_name, value)
            }
        }
    }
}

impl std::error::Error for ParseEnumError {}
