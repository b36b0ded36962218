//! # GraphQL Client
//!
//! [`PersonApi`] over the `/graphql` endpoint. Every operation is sent as
//! a document with variables; the first error entry in a response becomes
//! the [`ClientError`].

use crate::application::error::codes;
use crate::application::services::registration::NOT_FOUND;
use crate::client::api::{ClientResult, PersonApi};
use crate::client::error::ClientError;
use crate::domain::entities::Person;
use crate::domain::validation::PersonInput;
use crate::domain::value_objects::PersonId;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::time::Duration;

const USUARIO_FIELDS: &str = "fragment UsuarioFields on Usuario { \
    id nationalId firstNames lastNames birthDate gender city registeredAt updatedAt }";

const LIST: &str = "query { usuarios { ...UsuarioFields } }";

const GET: &str = "query($id: ID!) { usuario(id: $id) { ...UsuarioFields } }";

const CREATE: &str = "mutation($nationalId: String!, $firstNames: String!, $lastNames: String!, \
    $birthDate: String!, $gender: String!, $city: String!) { \
    crearUsuario(nationalId: $nationalId, firstNames: $firstNames, lastNames: $lastNames, \
    birthDate: $birthDate, gender: $gender, city: $city) { ...UsuarioFields } }";

const UPDATE: &str = "mutation($id: ID!, $nationalId: String!, $firstNames: String!, \
    $lastNames: String!, $birthDate: String!, $gender: String!, $city: String!) { \
    actualizarUsuario(id: $id, nationalId: $nationalId, firstNames: $firstNames, \
    lastNames: $lastNames, birthDate: $birthDate, gender: $gender, city: $city) \
    { ...UsuarioFields } }";

const DELETE: &str = "mutation($id: ID!) { eliminarUsuario(id: $id) }";

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
    #[serde(default)]
    extensions: ErrorExtensions,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorExtensions {
    code: Option<String>,
    #[serde(default)]
    fields: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ListData {
    usuarios: Vec<Person>,
}

#[derive(Debug, Deserialize)]
struct GetData {
    usuario: Option<Person>,
}

#[derive(Debug, Deserialize)]
struct CreateData {
    #[serde(rename = "crearUsuario")]
    person: Person,
}

#[derive(Debug, Deserialize)]
struct UpdateData {
    #[serde(rename = "actualizarUsuario")]
    person: Person,
}

#[derive(Debug, Deserialize)]
struct DeleteData {
    #[serde(rename = "eliminarUsuario")]
    deleted: bool,
}

/// HTTP client for a GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    client: Client,
    endpoint: String,
}

impl GraphqlClient {
    /// Creates a client for `endpoint` (e.g. `http://localhost:5000/graphql`).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if the HTTP client cannot be created.
    pub fn new(endpoint: impl Into<String>, timeout_ms: u64) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute<T: DeserializeOwned>(&self, document: &str, variables: Value) -> ClientResult<T> {
        let query = if document.contains("...UsuarioFields") {
            format!("{document} {USUARIO_FIELDS}")
        } else {
            document.to_string()
        };
        let body = json!({
            "query": query,
            "variables": variables,
        });
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        let parsed: GraphqlResponse<T> = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(format!("HTTP {status}: {e}")))?;

        if let Some(first) = parsed.errors.into_iter().next() {
            return Err(match first.extensions.code.as_deref() {
                Some(codes::INTERNAL) => ClientError::Server(first.message),
                _ => ClientError::Rejected {
                    message: first.message,
                    fields: first.extensions.fields,
                },
            });
        }

        parsed
            .data
            .ok_or_else(|| ClientError::Decode("response without data".to_string()))
    }
}

fn person_variables(input: &PersonInput) -> serde_json::Map<String, Value> {
    let field = |value: &Option<String>| Value::String(value.clone().unwrap_or_default());
    let mut vars = serde_json::Map::new();
    vars.insert("nationalId".into(), field(&input.national_id));
    vars.insert("firstNames".into(), field(&input.first_names));
    vars.insert("lastNames".into(), field(&input.last_names));
    vars.insert("birthDate".into(), field(&input.birth_date));
    vars.insert("gender".into(), field(&input.gender));
    vars.insert("city".into(), field(&input.city));
    vars
}

#[async_trait]
impl PersonApi for GraphqlClient {
    async fn list(&self) -> ClientResult<Vec<Person>> {
        let data: ListData = self.execute(LIST, json!({})).await?;
        Ok(data.usuarios)
    }

    async fn get(&self, id: &PersonId) -> ClientResult<Person> {
        let data: GetData = self.execute(GET, json!({ "id": id.as_str() })).await?;
        data.usuario.ok_or_else(|| ClientError::rejected(NOT_FOUND))
    }

    async fn create(&self, input: &PersonInput) -> ClientResult<Person> {
        let data: CreateData = self
            .execute(CREATE, Value::Object(person_variables(input)))
            .await?;
        Ok(data.person)
    }

    async fn update(&self, id: &PersonId, input: &PersonInput) -> ClientResult<Person> {
        let mut vars = person_variables(input);
        vars.insert("id".into(), Value::String(id.to_string()));
        let data: UpdateData = self.execute(UPDATE, Value::Object(vars)).await?;
        Ok(data.person)
    }

    async fn delete(&self, id: &PersonId) -> ClientResult<()> {
        let data: DeleteData = self.execute(DELETE, json!({ "id": id.as_str() })).await?;
        if data.deleted {
            Ok(())
        } else {
            Err(ClientError::Server("Error al eliminar usuario".to_string()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn person_json(id: &str) -> Value {
        json!({
            "id": id,
            "nationalId": "0102030405",
            "firstNames": "Juan Pedro",
            "lastNames": "Garcia Lopez",
            "birthDate": "1990-01-01T00:00:00.000Z",
            "gender": "Masculino",
            "city": "Quito",
            "registeredAt": "2024-03-01T10:00:00.000Z",
            "updatedAt": null
        })
    }

    async fn server_answering(body: Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    fn client(server: &MockServer) -> GraphqlClient {
        GraphqlClient::new(format!("{}/graphql", server.uri()), 1000).unwrap()
    }

    #[tokio::test]
    async fn list_reads_usuarios() {
        let server = server_answering(json!({"data": {"usuarios": [person_json("a1")]}})).await;
        let people = client(&server).list().await.unwrap();
        assert_eq!(people[0].id().as_str(), "a1");
    }

    #[tokio::test]
    async fn create_sends_variables() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({"variables": {"nationalId": "0102030405", "city": "Quito"}})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"crearUsuario": person_json("1")}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let input = PersonInput::new("0102030405", "Juan Pedro", "Garcia Lopez", "1990-01-01", "Masculino", "Quito");
        let person = client(&server).create(&input).await.unwrap();
        assert_eq!(person.data().city(), "Quito");
    }

    #[tokio::test]
    async fn null_usuario_is_not_found() {
        let server = server_answering(json!({"data": {"usuario": null}})).await;
        let err = client(&server).get(&PersonId::new("9")).await.unwrap_err();
        assert_eq!(err.to_string(), NOT_FOUND);
    }

    #[tokio::test]
    async fn error_entries_become_rejections() {
        let server = server_answering(json!({
            "data": null,
            "errors": [{
                "message": "El DNI ya está registrado",
                "extensions": {"code": "DUPLICATE_KEY"}
            }]
        }))
        .await;
        let input = PersonInput::default();
        let err = client(&server).create(&input).await.unwrap_err();
        assert!(err.is_rejection());
        assert_eq!(err.to_string(), "El DNI ya está registrado");
    }

    #[tokio::test]
    async fn internal_code_is_server_error() {
        let server = server_answering(json!({
            "data": null,
            "errors": [{"message": "Error al obtener usuarios", "extensions": {"code": "INTERNAL"}}]
        }))
        .await;
        let err = client(&server).list().await.unwrap_err();
        assert!(matches!(err, ClientError::Server(_)));
    }

    #[tokio::test]
    async fn delete_reads_boolean() {
        let server = server_answering(json!({"data": {"eliminarUsuario": true}})).await;
        client(&server).delete(&PersonId::new("1")).await.unwrap();
    }
}
