//! # Configuration
//!
//! Layered settings for the server binary.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. optional `registro.toml` in the working directory
//! 3. `REGISTRO__SECTION__KEY` environment variables (e.g. `REGISTRO__SERVER__PORT`)
//! 4. the legacy `PORT` and `MONGO_URI` variables
//!
//! A `.env` file is loaded into the process environment first by [`Settings::load`].

use crate::infrastructure::persistence::BackendKind;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Default config file name, without extension.
pub const CONFIG_FILE: &str = "registro";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "REGISTRO";

/// Default listening port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default MongoDB database name.
pub const DEFAULT_MONGO_DATABASE: &str = "formulario";

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Storage backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Backend served at `/usuarios` and `/graphql`.
    pub default_backend: BackendKind,
    /// SQLite connection URL; the backend is disabled when unset.
    #[serde(default)]
    pub sqlite_url: Option<String>,
    /// MongoDB connection string; the backend is disabled when unset.
    #[serde(default)]
    pub mongo_uri: Option<String>,
    /// MongoDB database name.
    pub mongo_database: String,
    /// JSON file with records to preload into the in-memory backend.
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            default_backend: BackendKind::Memory,
            sqlite_url: None,
            mongo_uri: None,
            mongo_database: DEFAULT_MONGO_DATABASE.to_string(),
            seed_file: None,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete application settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// HTTP listener.
    pub server: ServerConfig,
    /// Storage backends.
    pub storage: StorageConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

impl Settings {
    /// Loads `.env`, then builds settings from the file and process environment.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a source is malformed or a value has the
    /// wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_sources(Some(PathBuf::from(CONFIG_FILE)), std::env::vars().collect())
    }

    /// Builds settings from an optional config file and an explicit environment map.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a source is malformed or a value has the
    /// wrong type.
    pub fn from_sources(
        file: Option<PathBuf>,
        env: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("storage.default_backend", defaults.storage.default_backend.as_str())?
            .set_default("storage.mongo_database", defaults.storage.mongo_database)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.json", defaults.logging.json)?;

        if let Some(path) = file {
            builder = builder.add_source(
                File::with_name(&path.to_string_lossy())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let port = env.get("PORT").cloned();
        let mongo_uri = env.get("MONGO_URI").cloned();

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env)),
            )
            .set_override_option("server.port", port)?
            .set_override_option("storage.mongo_uri", mongo_uri)?
            .build()?
            .try_deserialize()
    }

    /// Returns the `host:port` string to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_without_sources() {
        let settings = Settings::from_sources(None, HashMap::new()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.bind_address(), "0.0.0.0:5000");
        assert_eq!(settings.storage.mongo_database, "formulario");
    }

    #[test]
    fn prefixed_environment_overrides_defaults() {
        let settings = Settings::from_sources(
            None,
            env(&[
                ("REGISTRO__SERVER__PORT", "8080"),
                ("REGISTRO__STORAGE__DEFAULT_BACKEND", "sqlite"),
                ("REGISTRO__STORAGE__SQLITE_URL", "sqlite::memory:"),
                ("REGISTRO__LOGGING__JSON", "true"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.storage.default_backend, BackendKind::Sqlite);
        assert_eq!(settings.storage.sqlite_url.as_deref(), Some("sqlite::memory:"));
        assert!(settings.logging.json);
    }

    #[test]
    fn legacy_variables_win() {
        let settings = Settings::from_sources(
            None,
            env(&[
                ("REGISTRO__SERVER__PORT", "8080"),
                ("PORT", "9090"),
                ("MONGO_URI", "mongodb://db:27017"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.storage.mongo_uri.as_deref(), Some("mongodb://db:27017"));
    }

    #[test]
    fn toml_file_is_read() {
        let dir = std::env::temp_dir().join(format!("registro-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("registro.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 7000\n\n[storage]\ndefault_backend = \"mongo\"\nseed_file = \"seed.json\""
        )
        .unwrap();

        let settings = Settings::from_sources(Some(path), HashMap::new()).unwrap();
        assert_eq!(settings.server.port, 7000);
        assert_eq!(settings.storage.default_backend, BackendKind::Mongo);
        assert_eq!(settings.storage.seed_file, Some(PathBuf::from("seed.json")));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn invalid_port_is_an_error() {
        let result = Settings::from_sources(None, env(&[("PORT", "not-a-port")]));
        assert!(result.is_err());
    }
}
