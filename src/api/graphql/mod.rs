//! # GraphQL API
//!
//! async-graphql schema served at `/graphql`.
//!
//! `POST /graphql` executes a request; `GET /graphql` serves GraphiQL.

pub mod schema;

pub use schema::{MutationRoot, QueryRoot, RegistroSchema, UsuarioObject, build_schema};

use async_graphql::http::GraphiQLSource;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};

/// Mount path of the endpoint.
pub const ENDPOINT: &str = "/graphql";

/// Executes one GraphQL request.
pub async fn graphql_handler(
    State(schema): State<RegistroSchema>,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    Json(schema.execute(request).await)
}

/// Serves the GraphiQL IDE.
#[allow(clippy::unused_async)]
pub async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint(ENDPOINT).finish())
}

/// Router exposing the endpoint, mergeable into any parent router.
pub fn router<S>(schema: RegistroSchema) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route(ENDPOINT, get(graphiql).post(graphql_handler))
        .with_state(schema)
}
