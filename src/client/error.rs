//! Client-side error type.

use crate::domain::validation::ValidationErrors;
use std::collections::BTreeMap;
use thiserror::Error;

/// Banner text shown when the form fails local validation.
pub const FORM_INVALID: &str = "Por favor corrija los errores en el formulario";

/// Errors raised by the HTTP clients and the form controller.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The form failed local validation; nothing was sent.
    #[error("Por favor corrija los errores en el formulario")]
    InvalidForm(ValidationErrors),

    /// The server refused the request (validation, duplicate or not found).
    #[error("{message}")]
    Rejected {
        /// Server message.
        message: String,
        /// Per-field messages, when the server sent them.
        fields: BTreeMap<String, String>,
    },

    /// The server failed while handling the request.
    #[error("{0}")]
    Server(String),

    /// The request never completed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The HTTP client could not be built, or a named target does not exist.
    #[error("client error: {0}")]
    Config(String),
}

impl ClientError {
    /// Creates a rejection without field details.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Returns the message to show the user, or `fallback` when the error
    /// carries nothing meaningful for them.
    #[must_use]
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            Self::InvalidForm(_) => FORM_INVALID,
            Self::Rejected { message, .. } | Self::Server(message) if !message.is_empty() => {
                message
            }
            _ => fallback,
        }
    }

    /// Returns true if the server refused the request.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}
