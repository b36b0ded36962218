//! # REST Client
//!
//! [`PersonApi`] over the JSON `usuarios` resource.
//!
//! # Examples
//!
//! ```ignore
//! use registro::client::RestClient;
//! use registro::infrastructure::persistence::BackendKind;
//!
//! let api = RestClient::for_backend("http://localhost:5000", Some(BackendKind::Sqlite), 5000)?;
//! let people = api.list().await?;
//! ```

use crate::api::rest::{DeleteResponse, ErrorResponse};
use crate::client::api::{ClientResult, PersonApi};
use crate::client::error::ClientError;
use crate::domain::entities::Person;
use crate::domain::validation::PersonInput;
use crate::domain::value_objects::PersonId;
use crate::infrastructure::persistence::BackendKind;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for one `usuarios` collection URL.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    resource_url: String,
}

impl RestClient {
    /// Creates a client for the collection at `resource_url`
    /// (e.g. `http://localhost:5000/usuarios`).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if the HTTP client cannot be created.
    pub fn new(resource_url: impl Into<String>, timeout_ms: u64) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            resource_url: resource_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Creates a client for a server, targeting a named backend or the default.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if the HTTP client cannot be created.
    pub fn for_backend(
        server_url: &str,
        backend: Option<BackendKind>,
        timeout_ms: u64,
    ) -> ClientResult<Self> {
        let server = server_url.trim_end_matches('/');
        let url = match backend {
            Some(kind) => format!("{server}/api/{kind}/usuarios"),
            None => format!("{server}/usuarios"),
        };
        Self::new(url, timeout_ms)
    }

    /// Returns the collection URL.
    #[must_use]
    pub fn resource_url(&self) -> &str {
        &self.resource_url
    }

    fn item_url(&self, id: &PersonId) -> String {
        format!("{}/{}", self.resource_url, id)
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ClientError::Decode(format!("failed to parse response: {e}")));
        }

        let body = response.text().await.unwrap_or_default();
        let (message, fields) = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(parsed) => (parsed.error, parsed.fields.unwrap_or_default()),
            Err(_) => (format!("HTTP {status}"), Default::default()),
        };

        if status.is_server_error() {
            Err(ClientError::Server(message))
        } else {
            Err(ClientError::Rejected { message, fields })
        }
    }
}

fn map_reqwest_error(error: reqwest::Error) -> ClientError {
    if error.is_timeout() {
        ClientError::Transport("request timed out".to_string())
    } else if error.is_connect() {
        ClientError::Transport(format!("connection failed: {error}"))
    } else {
        ClientError::Transport(format!("HTTP request failed: {error}"))
    }
}

#[async_trait]
impl PersonApi for RestClient {
    async fn list(&self) -> ClientResult<Vec<Person>> {
        let response = self
            .client
            .get(&self.resource_url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::handle_response(response).await
    }

    async fn get(&self, id: &PersonId) -> ClientResult<Person> {
        let response = self
            .client
            .get(self.item_url(id))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::handle_response(response).await
    }

    async fn create(&self, input: &PersonInput) -> ClientResult<Person> {
        let response = self
            .client
            .post(&self.resource_url)
            .json(input)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::handle_response(response).await
    }

    async fn update(&self, id: &PersonId, input: &PersonInput) -> ClientResult<Person> {
        let response = self
            .client
            .put(self.item_url(id))
            .json(input)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::handle_response(response).await
    }

    async fn delete(&self, id: &PersonId) -> ClientResult<()> {
        let response = self
            .client
            .delete(self.item_url(id))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::handle_response::<DeleteResponse>(response).await?;
        Ok(())
    }
}
