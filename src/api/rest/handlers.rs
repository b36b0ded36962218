//! # REST Handlers
//!
//! Request handlers for the `usuarios` resource and the health check.
//!
//! Every handler resolves its backend through [`SelectedBackend`]: the
//! `{backend}` path segment when present, the registry default otherwise.

use crate::application::error::ApplicationError;
use crate::application::services::registration::DELETED;
use crate::application::services::{BackendRegistry, PersonService};
use crate::domain::entities::Person;
use crate::domain::validation::PersonInput;
use crate::domain::value_objects::PersonId;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, Path, RawPathParams, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Generic messages for unexpected failures, per operation.
pub mod messages {
    /// Listing failed.
    pub const LIST_FAILED: &str = "Error al obtener usuarios";
    /// Fetching one record failed.
    pub const GET_FAILED: &str = "Error al obtener usuario";
    /// Creation failed.
    pub const CREATE_FAILED: &str = "Error al crear usuario";
    /// Update failed.
    pub const UPDATE_FAILED: &str = "Error al actualizar usuario";
    /// Deletion failed.
    pub const DELETE_FAILED: &str = "Error al eliminar usuario";
    /// Request body was not valid JSON for a person.
    pub const INVALID_BODY: &str = "El cuerpo de la solicitud no es un JSON válido";
}

// ============================================================================
// State
// ============================================================================

/// Shared state for all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Connected backends.
    pub registry: Arc<BackendRegistry>,
}

impl AppState {
    /// Wraps a registry.
    #[must_use]
    pub fn new(registry: BackendRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}

// ============================================================================
// Request / Response DTOs
// ============================================================================

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Per-field validation messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

impl ErrorResponse {
    /// Creates a body with only a message.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            fields: None,
        }
    }
}

/// Body returned by a successful delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Confirmation message.
    pub message: String,
    /// The removed record.
    pub usuario: Person,
}

/// Per-backend health entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendHealth {
    /// Backend route name.
    pub name: String,
    /// Record count, absent if the store could not be queried.
    pub records: Option<u64>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok` when every backend answered, `degraded` otherwise.
    pub status: String,
    /// Backend served by the unprefixed routes.
    pub default_backend: String,
    /// Connected backends.
    pub backends: Vec<BackendHealth>,
}

/// Path parameters for single-record routes.
#[derive(Debug, Deserialize)]
pub struct PersonPath {
    /// Record identifier.
    pub id: String,
}

// ============================================================================
// Errors
// ============================================================================

/// An error ready to be rendered as a JSON response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    /// Creates an error with a status and message.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse::new(message),
        }
    }

    /// Translates an application error; unexpected failures become
    /// `fallback` with status 500.
    #[must_use]
    pub fn from_application(err: ApplicationError, fallback: &str) -> Self {
        match &err {
            ApplicationError::Validation(errors) => Self {
                status: StatusCode::BAD_REQUEST,
                body: ErrorResponse {
                    error: err.to_string(),
                    fields: Some(
                        errors
                            .iter()
                            .map(|(field, message)| (field.as_str().to_string(), message.to_string()))
                            .collect(),
                    ),
                },
            },
            ApplicationError::DuplicateKey { .. } => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            ApplicationError::NotFound { .. } | ApplicationError::UnknownBackend(_) => {
                Self::new(StatusCode::NOT_FOUND, err.to_string())
            }
            ApplicationError::Infrastructure(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, fallback)
            }
        }
    }

    /// Returns the HTTP status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "rejected request body");
        Self::new(StatusCode::BAD_REQUEST, messages::INVALID_BODY)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

// ============================================================================
// Extractors
// ============================================================================

/// The service selected by the `{backend}` path segment, or the default.
#[derive(Debug, Clone)]
pub struct SelectedBackend(pub PersonService);

impl FromRequestParts<AppState> for SelectedBackend {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let params = RawPathParams::from_request_parts(parts, state).await.ok();
        let named = params
            .as_ref()
            .and_then(|params| params.iter().find(|(key, _)| *key == "backend").map(|(_, value)| value));

        let service = match named {
            Some(name) => state
                .registry
                .resolve(name)
                .map_err(|e| ApiError::new(StatusCode::NOT_FOUND, e.to_string()))?,
            None => state.registry.default_service(),
        };
        Ok(Self(service.clone()))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /usuarios`
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn list_people(
    SelectedBackend(service): SelectedBackend,
) -> Result<Json<Vec<Person>>, ApiError> {
    let people = service
        .list()
        .await
        .map_err(|e| ApiError::from_application(e, messages::LIST_FAILED))?;
    Ok(Json(people))
}

/// `GET /usuarios/{id}`
///
/// # Errors
///
/// Returns 404 if the record does not exist.
pub async fn get_person(
    SelectedBackend(service): SelectedBackend,
    Path(path): Path<PersonPath>,
) -> Result<Json<Person>, ApiError> {
    let person = service
        .get(&PersonId::new(path.id))
        .await
        .map_err(|e| ApiError::from_application(e, messages::GET_FAILED))?;
    Ok(Json(person))
}

/// `POST /usuarios`
///
/// # Errors
///
/// Returns 400 for invalid input or a taken DNI.
pub async fn create_person(
    SelectedBackend(service): SelectedBackend,
    body: Result<Json<PersonInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Person>), ApiError> {
    let Json(input) = body?;
    let person = service
        .create(&input)
        .await
        .map_err(|e| ApiError::from_application(e, messages::CREATE_FAILED))?;
    Ok((StatusCode::CREATED, Json(person)))
}

/// `PUT /usuarios/{id}`
///
/// # Errors
///
/// Returns 400 for invalid input or a taken DNI, 404 if the record does not exist.
pub async fn update_person(
    SelectedBackend(service): SelectedBackend,
    Path(path): Path<PersonPath>,
    body: Result<Json<PersonInput>, JsonRejection>,
) -> Result<Json<Person>, ApiError> {
    let Json(input) = body?;
    let person = service
        .update(&PersonId::new(path.id), &input)
        .await
        .map_err(|e| ApiError::from_application(e, messages::UPDATE_FAILED))?;
    Ok(Json(person))
}

/// `DELETE /usuarios/{id}`
///
/// # Errors
///
/// Returns 404 if the record does not exist.
pub async fn delete_person(
    SelectedBackend(service): SelectedBackend,
    Path(path): Path<PersonPath>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let usuario = service
        .delete(&PersonId::new(path.id))
        .await
        .map_err(|e| ApiError::from_application(e, messages::DELETE_FAILED))?;
    Ok(Json(DeleteResponse {
        message: DELETED.to_string(),
        usuario,
    }))
}

/// `GET /health`
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut backends = Vec::new();
    for (kind, service) in state.registry.iter() {
        let records = match service.count().await {
            Ok(count) => Some(count),
            Err(err) => {
                warn!(backend = %kind, error = %err, "health check count failed");
                None
            }
        };
        backends.push(BackendHealth {
            name: kind.to_string(),
            records,
        });
    }

    let status = if backends.iter().all(|b| b.records.is_some()) {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        default_backend: state.registry.default_backend().to_string(),
        backends,
    })
}
