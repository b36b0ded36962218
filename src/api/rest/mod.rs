//! # REST API
//!
//! REST endpoints using axum.
//!
//! # Endpoints
//!
//! ## Usuarios (default backend)
//! - `GET /usuarios` - List all records
//! - `GET /usuarios/{id}` - Get a record
//! - `POST /usuarios` - Register a person
//! - `PUT /usuarios/{id}` - Replace a record's fields
//! - `DELETE /usuarios/{id}` - Delete a record
//!
//! ## Usuarios (named backend)
//! - The same routes under `/api/{backend}`, where `backend` is `memory`,
//!   `sqlite` or `mongo`
//!
//! ## Health
//! - `GET /health` - Backends and record counts
//!
//! # Usage
//!
//! ```ignore
//! use registro::api::rest::{create_router, AppState};
//! use registro::application::services::BackendRegistry;
//!
//! let registry = BackendRegistry::connect(&settings.storage).await;
//! let router = create_router(AppState::new(registry));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, router).await?;
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    ApiError, AppState, BackendHealth, DeleteResponse, ErrorResponse, HealthResponse, PersonPath,
    SelectedBackend,
};
pub use routes::create_router;
