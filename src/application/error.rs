//! # Application Errors
//!
//! Error types for the application layer.
//!
//! These errors represent failures that can occur while serving a use case:
//! rejected input, uniqueness conflicts, missing records and infrastructure
//! failures. Transports translate them into their own envelopes.
//!
//! # Error Hierarchy
//!
//! ```text
//! ApplicationError
//! ├── Validation(ValidationErrors)      - Field-level input failures
//! ├── DuplicateKey { message }          - DNI already registered
//! ├── NotFound { message }              - No record with that id
//! ├── UnknownBackend(String)            - Backend not configured
//! └── Infrastructure(RepositoryError)   - Storage failures (unexpected)
//! ```
//!
//! # Examples
//!
//! ```
//! use registro::application::error::ApplicationError;
//! use registro::infrastructure::persistence::RepositoryError;
//!
//! let err = ApplicationError::not_found("Usuario no encontrado");
//! assert!(err.is_not_found());
//!
//! let err: ApplicationError = RepositoryError::connection("refused").into();
//! assert!(err.is_unexpected());
//! ```

use crate::domain::validation::ValidationErrors;
use crate::infrastructure::persistence::RepositoryError;
use thiserror::Error;

/// Machine-readable error codes shared by the transports.
pub mod codes {
    /// Input failed validation.
    pub const VALIDATION: &str = "VALIDATION";
    /// DNI already registered.
    pub const DUPLICATE_KEY: &str = "DUPLICATE_KEY";
    /// Record or backend not found.
    pub const NOT_FOUND: &str = "NOT_FOUND";
    /// Unexpected failure.
    pub const INTERNAL: &str = "INTERNAL";
}

/// Application layer error.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Input failed validation. Displays the first field message.
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// The DNI is already used by another record.
    #[error("{message}")]
    DuplicateKey {
        /// User-facing message.
        message: String,
    },

    /// No record with the requested id.
    #[error("{message}")]
    NotFound {
        /// User-facing message.
        message: String,
    },

    /// The requested storage backend is not configured.
    #[error("Backend no disponible: {0}")]
    UnknownBackend(String),

    /// Storage failure.
    #[error("infrastructure error: {0}")]
    Infrastructure(#[from] RepositoryError),
}

impl ApplicationError {
    /// Creates a duplicate key error.
    #[must_use]
    pub fn duplicate_key(message: impl Into<String>) -> Self {
        Self::DuplicateKey {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates an unknown backend error.
    #[must_use]
    pub fn unknown_backend(name: impl Into<String>) -> Self {
        Self::UnknownBackend(name.into())
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a uniqueness conflict.
    #[must_use]
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }

    /// Returns true if a record or backend was not found.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::UnknownBackend(_))
    }

    /// Returns true if the failure is not the caller's fault.
    ///
    /// Unexpected errors are logged and never shown verbatim to clients.
    #[must_use]
    pub fn is_unexpected(&self) -> bool {
        matches!(self, Self::Infrastructure(_))
    }

    /// Returns the validation details, if any.
    #[must_use]
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Returns the machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => codes::VALIDATION,
            Self::DuplicateKey { .. } => codes::DUPLICATE_KEY,
            Self::NotFound { .. } | Self::UnknownBackend(_) => codes::NOT_FOUND,
            Self::Infrastructure(_) => codes::INTERNAL,
        }
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
