//! # REST Routes
//!
//! Router construction for the REST API.

use crate::api::graphql;
use crate::api::rest::handlers::{
    AppState, create_person, delete_person, get_person, health_check, list_people, update_person,
};
use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Routes for the `usuarios` resource, relative to their mount point.
fn person_routes() -> Router<AppState> {
    Router::new()
        .route("/usuarios", get(list_people).post(create_person))
        .route(
            "/usuarios/{id}",
            get(get_person).put(update_person).delete(delete_person),
        )
}

/// Creates the application router.
///
/// # Routes
///
/// - `/usuarios`, `/usuarios/{id}`: default backend
/// - `/api/{backend}/usuarios`, `/api/{backend}/usuarios/{id}`: named backend
/// - `/graphql`: GraphQL endpoint (GraphiQL on GET)
/// - `/health`: backend status
pub fn create_router(state: AppState) -> Router {
    let schema = graphql::build_schema(state.registry.default_service().clone());

    Router::new()
        .merge(person_routes())
        .nest("/api/{backend}", person_routes())
        .route("/health", get(health_check))
        .merge(graphql::router(schema))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
