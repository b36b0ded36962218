//! # SQLite Person Repository
//!
//! SQLite implementation of [`PersonRepository`] using sqlx.
//!
//! Records live in the `usuarios` table. Timestamps are stored as Unix
//! milliseconds. The `dni` column carries a `UNIQUE` constraint so that a
//! concurrent insert slipping past the pre-check is still rejected.

use crate::domain::entities::{Person, PersonData};
use crate::domain::value_objects::{Gender, NationalId, PersonId, Timestamp};
use crate::infrastructure::persistence::traits::{
    BackendKind, PersonRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::debug;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS usuarios (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        dni TEXT NOT NULL UNIQUE,
        nombres TEXT NOT NULL,
        apellidos TEXT NOT NULL,
        fecha_nacimiento INTEGER NOT NULL,
        genero TEXT NOT NULL,
        ciudad TEXT NOT NULL,
        fecha_registro INTEGER NOT NULL,
        fecha_actualizacion INTEGER
    )
"#;

/// SQLite implementation of [`PersonRepository`].
///
/// # Examples
///
/// ```ignore
/// use registro::infrastructure::persistence::sqlite::SqlitePersonRepository;
///
/// let repo = SqlitePersonRepository::connect("sqlite://usuarios.db?mode=rwc", 5).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SqlitePersonRepository {
    pool: SqlitePool,
}

impl SqlitePersonRepository {
    /// Wraps an existing pool and makes sure the table exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Query` if the schema cannot be created.
    pub async fn new(pool: SqlitePool) -> RepositoryResult<Self> {
        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .map_err(|e| RepositoryError::query(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Connects to `url` and prepares the schema.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Connection` if the database cannot be opened.
    pub async fn connect(url: &str, max_connections: u32) -> RepositoryResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| RepositoryError::connection(e.to_string()))?;
        Self::new(pool).await
    }

    /// Opens a private in-memory database.
    ///
    /// Uses a single connection that is never recycled, since every SQLite
    /// `:memory:` connection is its own database.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Connection` if SQLite cannot be opened.
    pub async fn in_memory() -> RepositoryResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| RepositoryError::connection(e.to_string()))?;
        Self::new(pool).await
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn national_id_taken(&self, dni: &str, except: i64) -> RepositoryResult<bool> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM usuarios WHERE dni = ? AND id <> ?")
                .bind(dni)
                .bind(except)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| RepositoryError::query(e.to_string()))?;
        Ok(count > 0)
    }
}

#[async_trait]
impl PersonRepository for SqlitePersonRepository {
    fn backend(&self) -> BackendKind {
        BackendKind::Sqlite
    }

    async fn list(&self) -> RepositoryResult<Vec<Person>> {
        let rows: Vec<PersonRow> = sqlx::query_as(
            r#"
            SELECT id, dni, nombres, apellidos, fecha_nacimiento,
                   genero, ciudad, fecha_registro, fecha_actualizacion
            FROM usuarios
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::query(e.to_string()))?;

        rows.into_iter().map(PersonRow::try_into_person).collect()
    }

    async fn get(&self, id: &PersonId) -> RepositoryResult<Option<Person>> {
        let Some(key) = id.as_integer() else {
            return Ok(None);
        };

        let row: Option<PersonRow> = sqlx::query_as(
            r#"
            SELECT id, dni, nombres, apellidos, fecha_nacimiento,
                   genero, ciudad, fecha_registro, fecha_actualizacion
            FROM usuarios
            WHERE id = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::query(e.to_string()))?;

        row.map(PersonRow::try_into_person).transpose()
    }

    async fn create(&self, data: PersonData) -> RepositoryResult<Person> {
        let dni = data.national_id().as_str();
        if self.national_id_taken(dni, 0).await? {
            return Err(RepositoryError::duplicate_national_id(dni));
        }

        let row: PersonRow = sqlx::query_as(
            r#"
            INSERT INTO usuarios (
                dni, nombres, apellidos, fecha_nacimiento,
                genero, ciudad, fecha_registro
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, dni, nombres, apellidos, fecha_nacimiento,
                      genero, ciudad, fecha_registro, fecha_actualizacion
            "#,
        )
        .bind(dni)
        .bind(data.first_names())
        .bind(data.last_names())
        .bind(data.birth_date().timestamp_millis())
        .bind(data.gender().as_str())
        .bind(data.city())
        .bind(Timestamp::now().timestamp_millis())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, dni))?;

        debug!(id = row.id, "person inserted into sqlite");
        row.try_into_person()
    }

    async fn update(&self, id: &PersonId, data: PersonData) -> RepositoryResult<Person> {
        let dni = data.national_id().as_str();
        let key = id.as_integer();
        if self.national_id_taken(dni, key.unwrap_or(0)).await? {
            return Err(RepositoryError::duplicate_national_id(dni));
        }
        let Some(key) = key else {
            return Err(RepositoryError::not_found(id));
        };

        let row: Option<PersonRow> = sqlx::query_as(
            r#"
            UPDATE usuarios
            SET dni = ?, nombres = ?, apellidos = ?, fecha_nacimiento = ?,
                genero = ?, ciudad = ?, fecha_actualizacion = ?
            WHERE id = ?
            RETURNING id, dni, nombres, apellidos, fecha_nacimiento,
                      genero, ciudad, fecha_registro, fecha_actualizacion
            "#,
        )
        .bind(dni)
        .bind(data.first_names())
        .bind(data.last_names())
        .bind(data.birth_date().timestamp_millis())
        .bind(data.gender().as_str())
        .bind(data.city())
        .bind(Timestamp::now().timestamp_millis())
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, dni))?;

        debug!(id = key, "person updated in sqlite");
        row.ok_or_else(|| RepositoryError::not_found(id))?
            .try_into_person()
    }

    async fn delete(&self, id: &PersonId) -> RepositoryResult<Person> {
        let Some(key) = id.as_integer() else {
            return Err(RepositoryError::not_found(id));
        };

        let row: Option<PersonRow> = sqlx::query_as(
            r#"
            DELETE FROM usuarios
            WHERE id = ?
            RETURNING id, dni, nombres, apellidos, fecha_nacimiento,
                      genero, ciudad, fecha_registro, fecha_actualizacion
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::query(e.to_string()))?;

        row.ok_or_else(|| RepositoryError::not_found(id))?
            .try_into_person()
    }

    async fn count(&self) -> RepositoryResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM usuarios")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::query(e.to_string()))?;

        Ok(u64::try_from(count).unwrap_or(0))
    }
}

/// Maps insert/update failures, turning `UNIQUE` violations into duplicate keys.
fn map_write_error(err: sqlx::Error, dni: &str) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::duplicate_national_id(dni)
        }
        _ => RepositoryError::query(err.to_string()),
    }
}

/// Row type for person queries.
#[derive(Debug, sqlx::FromRow)]
struct PersonRow {
    id: i64,
    dni: String,
    nombres: String,
    apellidos: String,
    fecha_nacimiento: i64,
    genero: String,
    ciudad: String,
    fecha_registro: i64,
    fecha_actualizacion: Option<i64>,
}

impl PersonRow {
    /// Converts the row into a Person.
    fn try_into_person(self) -> RepositoryResult<Person> {
        let national_id = NationalId::parse(&self.dni)
            .map_err(|e| RepositoryError::serialization(e.to_string()))?;
        let gender = self
            .genero
            .parse::<Gender>()
            .map_err(|e| RepositoryError::serialization(e.to_string()))?;
        let birth_date = millis(self.fecha_nacimiento)?;
        let registered_at = millis(self.fecha_registro)?;
        let updated_at = self.fecha_actualizacion.map(millis).transpose()?;

        let data = PersonData::from_parts(
            national_id,
            self.nombres,
            self.apellidos,
            birth_date,
            gender,
            self.ciudad,
        );
        Ok(Person::from_parts(
            PersonId::from_integer(self.id),
            data,
            registered_at,
            updated_at,
        ))
    }
}

fn millis(value: i64) -> RepositoryResult<Timestamp> {
    Timestamp::from_millis(value)
        .ok_or_else(|| RepositoryError::serialization("invalid timestamp".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::contract::{self, person_repository_contract};

    person_repository_contract!(SqlitePersonRepository::in_memory().await.unwrap());

    #[tokio::test]
    async fn ids_are_integers() {
        let repo = SqlitePersonRepository::in_memory().await.unwrap();
        let created = repo.create(contract::data("11111111", "Ana")).await.unwrap();
        assert_eq!(created.id().as_integer(), Some(1));
    }

    #[tokio::test]
    async fn unique_constraint_backs_the_pre_check() {
        let repo = SqlitePersonRepository::in_memory().await.unwrap();
        repo.create(contract::data("11111111", "Ana")).await.unwrap();

        let err = sqlx::query(
            "INSERT INTO usuarios (dni, nombres, apellidos, fecha_nacimiento, genero, ciudad, fecha_registro)
             VALUES ('11111111', 'X', 'Y', 0, 'Otro', 'Quito', 0)",
        )
        .execute(repo.pool())
        .await
        .unwrap_err();

        assert!(map_write_error(err, "11111111").is_duplicate_key());
    }

    #[tokio::test]
    async fn schema_creation_is_idempotent() {
        let repo = SqlitePersonRepository::in_memory().await.unwrap();
        repo.create(contract::data("11111111", "Ana")).await.unwrap();

        let again = SqlitePersonRepository::new(repo.pool().clone()).await.unwrap();
        assert_eq!(again.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn corrupt_rows_surface_as_serialization_errors() {
        let repo = SqlitePersonRepository::in_memory().await.unwrap();
        sqlx::query(
            "INSERT INTO usuarios (dni, nombres, apellidos, fecha_nacimiento, genero, ciudad, fecha_registro)
             VALUES ('11111111', 'X', 'Y', 0, 'desconocido', 'Quito', 0)",
        )
        .execute(repo.pool())
        .await
        .unwrap();

        let err = repo.list().await.unwrap_err();
        assert!(matches!(err, RepositoryError::Serialization(_)));
    }
}
