//! End-to-end tests of the REST routes through the full router.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use registro::api::rest::{AppState, create_router};
use registro::application::services::BackendRegistry;
use registro::infrastructure::persistence::{
    BackendKind, InMemoryPersonRepository, PersonRepository, SqlitePersonRepository,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

async fn app() -> Router {
    let memory: Arc<dyn PersonRepository> = Arc::new(InMemoryPersonRepository::new());
    let sqlite: Arc<dyn PersonRepository> =
        Arc::new(SqlitePersonRepository::in_memory().await.expect("sqlite"));
    let registry = BackendRegistry::from_repositories(vec![memory, sqlite], BackendKind::Memory);
    create_router(AppState::new(registry))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn juan() -> Value {
    json!({
        "nationalId": "0102030405",
        "firstNames": "Juan Pedro",
        "lastNames": "Garcia Lopez",
        "birthDate": "1990-01-01",
        "gender": "Masculino",
        "city": "Quito"
    })
}

#[tokio::test]
async fn create_then_get_round_trips() {
    let app = app().await;

    let (status, created) = send(&app, Method::POST, "/usuarios", Some(juan())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert!(created["registeredAt"].is_string());
    assert!(created["updatedAt"].is_null());
    assert_eq!(created["birthDate"], "1990-01-01T00:00:00.000Z");

    let (status, fetched) = send(&app, Method::GET, &format!("/usuarios/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn legacy_field_names_are_accepted() {
    let app = app().await;
    let body = json!({
        "dni": "12345678",
        "nombres": "Ana",
        "apellidos": "Mora",
        "fechaNacimiento": "1985-05-05",
        "genero": "femenino",
        "ciudad": "Loja"
    });

    let (status, created) = send(&app, Method::POST, "/usuarios", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["nationalId"], "12345678");
    assert_eq!(created["gender"], "Femenino");
}

#[tokio::test]
async fn validation_failure_lists_fields() {
    let app = app().await;
    let mut body = juan();
    body["nationalId"] = json!("123");
    body["city"] = json!("  ");

    let (status, error) = send(&app, Method::POST, "/usuarios", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "El DNI debe tener entre 8 y 10 dígitos");
    assert_eq!(error["fields"]["city"], "Debe seleccionar una ciudad");
    assert!(error["fields"].get("firstNames").is_none());
}

#[tokio::test]
async fn duplicate_dni_is_rejected_once_stored() {
    let app = app().await;
    send(&app, Method::POST, "/usuarios", Some(juan())).await;

    let (status, error) = send(&app, Method::POST, "/usuarios", Some(juan())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "El DNI ya está registrado");

    let (_, all) = send(&app, Method::GET, "/usuarios", None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn update_checks_other_records() {
    let app = app().await;
    let (_, a) = send(&app, Method::POST, "/usuarios", Some(juan())).await;
    let mut other = juan();
    other["nationalId"] = json!("99999999");
    send(&app, Method::POST, "/usuarios", Some(other.clone())).await;

    let uri = format!("/usuarios/{}", a["id"].as_str().unwrap());
    let (status, error) = send(&app, Method::PUT, &uri, Some(other)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "El DNI ya está registrado en otro usuario");

    let mut renamed = juan();
    renamed["firstNames"] = json!("Juan Carlos");
    let (status, updated) = send(&app, Method::PUT, &uri, Some(renamed)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["firstNames"], "Juan Carlos");
    assert!(updated["updatedAt"].is_string());
    assert_eq!(updated["registeredAt"], a["registeredAt"]);
}

#[tokio::test]
async fn missing_records_are_404() {
    let app = app().await;

    let (status, error) = send(&app, Method::GET, "/usuarios/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "Usuario no encontrado");

    let (status, _) = send(&app, Method::PUT, "/usuarios/42", Some(juan())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/usuarios/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_returns_message_and_record() {
    let app = app().await;
    let (_, created) = send(&app, Method::POST, "/usuarios", Some(juan())).await;
    let uri = format!("/usuarios/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Usuario eliminado correctamente");
    assert_eq!(body["usuario"], created);

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_json_is_400() {
    let app = app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/usuarios")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrongly_typed_fields_are_field_errors() {
    let app = app().await;

    let mut numeric = juan();
    numeric["nationalId"] = json!(12345678);
    let (status, created) = send(&app, Method::POST, "/usuarios", Some(numeric)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["nationalId"], "12345678");

    let mut listed = juan();
    listed["city"] = json!(["Quito"]);
    let (status, error) = send(&app, Method::POST, "/usuarios", Some(listed)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "La ciudad debe ser texto");
    assert_eq!(error["fields"]["city"], "La ciudad debe ser texto");
    assert!(error["fields"].get("nationalId").is_none());
}

#[tokio::test]
async fn birth_date_without_offset_is_utc() {
    let app = app().await;
    let mut body = juan();
    body["birthDate"] = json!("1990-01-01T10:00:00");

    let (status, created) = send(&app, Method::POST, "/usuarios", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["birthDate"], "1990-01-01T10:00:00.000Z");
}

#[tokio::test]
async fn only_canonical_ids_resolve() {
    let app = app().await;
    for backend in ["memory", "sqlite"] {
        let base = format!("/api/{backend}/usuarios");
        let (_, created) = send(&app, Method::POST, &base, Some(juan())).await;
        assert_eq!(created["id"], "1");

        for alias in ["01", "+1", " 1"] {
            let uri = format!("{base}/{}", alias.replace(' ', "%20"));
            let (status, _) = send(&app, Method::GET, &uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{backend} {alias}");
            let (status, _) = send(&app, Method::DELETE, &uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{backend} {alias}");
        }

        let (status, _) = send(&app, Method::GET, &format!("{base}/1"), None).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn named_backends_are_isolated() {
    let app = app().await;

    let (status, created) =
        send(&app, Method::POST, "/api/sqlite/usuarios", Some(juan())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], "1");

    let (_, sqlite) = send(&app, Method::GET, "/api/sqlite/usuarios", None).await;
    let (_, memory) = send(&app, Method::GET, "/api/memory/usuarios", None).await;
    let (_, default) = send(&app, Method::GET, "/usuarios", None).await;
    assert_eq!(sqlite.as_array().unwrap().len(), 1);
    assert!(memory.as_array().unwrap().is_empty());
    assert_eq!(memory, default);

    let (status, _) = send(&app, Method::GET, "/api/sqlite/usuarios/1", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_backend_is_404() {
    let app = app().await;
    let (status, error) = send(&app, Method::GET, "/api/mongo/usuarios", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(error["error"].as_str().unwrap().contains("mongo"));

    let (status, _) = send(&app, Method::GET, "/api/redis/usuarios", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_backends() {
    let app = app().await;
    send(&app, Method::POST, "/usuarios", Some(juan())).await;

    let (status, health) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["defaultBackend"], "memory");
    assert_eq!(
        health["backends"],
        json!([
            {"name": "memory", "records": 1},
            {"name": "sqlite", "records": 0}
        ])
    );
}
