//! Backend construction from configuration.

use crate::config::StorageConfig;
use crate::domain::entities::PersonData;
use crate::domain::validation::{PersonInput, validate_now};
use crate::infrastructure::persistence::in_memory::InMemoryPersonRepository;
use crate::infrastructure::persistence::sqlite::SqlitePersonRepository;
use crate::infrastructure::persistence::traits::{
    BackendKind, PersonRepository, RepositoryError, RepositoryResult,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Pool size for file-backed SQLite databases.
const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// Connects the requested backend.
///
/// Returns `Ok(None)` when the backend is not configured (no URL given, or
/// the crate was built without its feature).
///
/// # Errors
///
/// Returns the repository error if a configured backend cannot be reached
/// or the seed file cannot be loaded.
pub async fn connect_backend(
    kind: BackendKind,
    config: &StorageConfig,
) -> RepositoryResult<Option<Arc<dyn PersonRepository>>> {
    match kind {
        BackendKind::Memory => {
            let repo = match &config.seed_file {
                Some(path) => {
                    let seed = load_seed_file(path)?;
                    info!(path = %path.display(), records = seed.len(), "seeding in-memory backend");
                    InMemoryPersonRepository::seeded(seed)
                }
                None => InMemoryPersonRepository::new(),
            };
            Ok(Some(Arc::new(repo)))
        }
        BackendKind::Sqlite => {
            let Some(url) = &config.sqlite_url else {
                return Ok(None);
            };
            let repo = if url.contains(":memory:") {
                SqlitePersonRepository::in_memory().await?
            } else {
                SqlitePersonRepository::connect(url, SQLITE_MAX_CONNECTIONS).await?
            };
            Ok(Some(Arc::new(repo)))
        }
        BackendKind::Mongo => connect_mongo(config).await,
    }
}

#[cfg(feature = "mongo")]
async fn connect_mongo(
    config: &StorageConfig,
) -> RepositoryResult<Option<Arc<dyn PersonRepository>>> {
    use crate::infrastructure::persistence::mongo::MongoPersonRepository;

    let Some(uri) = &config.mongo_uri else {
        return Ok(None);
    };
    let repo = MongoPersonRepository::connect(uri, &config.mongo_database).await?;
    Ok(Some(Arc::new(repo)))
}

#[cfg(not(feature = "mongo"))]
#[allow(clippy::unused_async)]
async fn connect_mongo(
    config: &StorageConfig,
) -> RepositoryResult<Option<Arc<dyn PersonRepository>>> {
    if config.mongo_uri.is_some() {
        warn!("mongo_uri is set but the crate was built without the `mongo` feature");
    }
    Ok(None)
}

/// Reads a JSON array of person records and validates each one.
///
/// Entries that fail validation are skipped with a warning.
///
/// # Errors
///
/// Returns `RepositoryError::Serialization` if the file cannot be read or is
/// not a JSON array of objects.
pub fn load_seed_file(path: &Path) -> RepositoryResult<Vec<PersonData>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| RepositoryError::serialization(format!("{}: {e}", path.display())))?;
    parse_seed(&raw)
}

fn parse_seed(raw: &str) -> RepositoryResult<Vec<PersonData>> {
    let inputs: Vec<PersonInput> =
        serde_json::from_str(raw).map_err(|e| RepositoryError::serialization(e.to_string()))?;

    let mut seed = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        match validate_now(input) {
            Ok(data) => seed.push(data),
            Err(errors) => warn!(index, error = %errors, "skipping invalid seed record"),
        }
    }
    Ok(seed)
}
