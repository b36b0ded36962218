//! # Backend Registry
//!
//! One [`PersonService`] per connected storage backend, plus the default
//! used by the unprefixed REST routes and GraphQL.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::registration::PersonService;
use crate::config::StorageConfig;
use crate::infrastructure::persistence::{
    BackendKind, InMemoryPersonRepository, PersonRepository, connect_backend,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Services keyed by backend.
///
/// Always contains the in-memory backend, which also serves as the default
/// when the preferred one is unavailable.
#[derive(Debug, Clone)]
pub struct BackendRegistry {
    services: BTreeMap<BackendKind, PersonService>,
    default: PersonService,
}

impl BackendRegistry {
    /// Connects every configured backend.
    ///
    /// A backend that fails to connect is logged and left out.
    pub async fn connect(config: &StorageConfig) -> Self {
        let mut repositories: Vec<Arc<dyn PersonRepository>> = Vec::new();

        for kind in [BackendKind::Memory, BackendKind::Sqlite, BackendKind::Mongo] {
            match connect_backend(kind, config).await {
                Ok(Some(repo)) => {
                    info!(backend = %kind, "storage backend connected");
                    repositories.push(repo);
                }
                Ok(None) => debug!(backend = %kind, "storage backend not configured"),
                Err(err) => warn!(backend = %kind, error = %err, "storage backend unavailable"),
            }
        }

        Self::from_repositories(repositories, config.default_backend)
    }

    /// Builds a registry from already-connected repositories.
    ///
    /// A later repository of the same kind replaces an earlier one. If
    /// `preferred` is missing, the in-memory backend becomes the default.
    #[must_use]
    pub fn from_repositories(
        repositories: impl IntoIterator<Item = Arc<dyn PersonRepository>>,
        preferred: BackendKind,
    ) -> Self {
        let mut services: BTreeMap<BackendKind, PersonService> = repositories
            .into_iter()
            .map(|repo| (repo.backend(), PersonService::new(repo)))
            .collect();

        let memory = services
            .entry(BackendKind::Memory)
            .or_insert_with(|| PersonService::new(Arc::new(InMemoryPersonRepository::new())))
            .clone();

        let default = match services.get(&preferred) {
            Some(service) => service.clone(),
            None => {
                warn!(
                    preferred = %preferred,
                    "default backend unavailable, falling back to memory"
                );
                memory
            }
        };

        Self { services, default }
    }

    /// Returns the default service.
    #[must_use]
    pub fn default_service(&self) -> &PersonService {
        &self.default
    }

    /// Returns the default backend kind.
    #[must_use]
    pub fn default_backend(&self) -> BackendKind {
        self.default.backend()
    }

    /// Returns the service for `kind`, if connected.
    #[must_use]
    pub fn get(&self, kind: BackendKind) -> Option<&PersonService> {
        self.services.get(&kind)
    }

    /// Resolves a backend by its route name.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::UnknownBackend` if the name is not a backend
    /// or that backend is not connected.
    pub fn resolve(&self, name: &str) -> ApplicationResult<&PersonService> {
        name.parse::<BackendKind>()
            .ok()
            .and_then(|kind| self.get(kind))
            .ok_or_else(|| ApplicationError::unknown_backend(name))
    }

    /// Iterates over connected backends in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (BackendKind, &PersonService)> {
        self.services.iter().map(|(kind, service)| (*kind, service))
    }
}
