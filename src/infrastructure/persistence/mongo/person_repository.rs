//! # MongoDB Person Repository
//!
//! MongoDB implementation of [`PersonRepository`].
//!
//! Documents live in the `usuarios` collection using the field names of the
//! original registration form (`dni`, `nombres`, `fechaNacimiento`, ...).
//! A unique index on `dni` is created on connect; duplicate-key server
//! errors (code 11000) are reported as [`RepositoryError::DuplicateKey`].

use crate::domain::entities::{Person, PersonData};
use crate::domain::value_objects::{Gender, NationalId, PersonId, Timestamp};
use crate::infrastructure::persistence::traits::{
    BackendKind, PersonRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{DateTime as BsonDateTime, Document, doc};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Collection holding person documents.
pub const COLLECTION: &str = "usuarios";

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Stored document shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    dni: String,
    nombres: String,
    apellidos: String,
    fecha_nacimiento: BsonDateTime,
    genero: String,
    ciudad: String,
    fecha_registro: BsonDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fecha_actualizacion: Option<BsonDateTime>,
}

impl PersonDocument {
    fn new(data: &PersonData, registered_at: Timestamp) -> Self {
        Self {
            id: None,
            dni: data.national_id().to_string(),
            nombres: data.first_names().to_string(),
            apellidos: data.last_names().to_string(),
            fecha_nacimiento: bson_time(data.birth_date()),
            genero: data.gender().to_string(),
            ciudad: data.city().to_string(),
            fecha_registro: bson_time(registered_at),
            fecha_actualizacion: None,
        }
    }

    fn try_into_person(self) -> RepositoryResult<Person> {
        let id = self
            .id
            .ok_or_else(|| RepositoryError::serialization("document without _id".to_string()))?;
        let national_id = NationalId::parse(&self.dni)
            .map_err(|e| RepositoryError::serialization(e.to_string()))?;
        let gender = self
            .genero
            .parse::<Gender>()
            .map_err(|e| RepositoryError::serialization(e.to_string()))?;

        let data = PersonData::from_parts(
            national_id,
            self.nombres,
            self.apellidos,
            timestamp(self.fecha_nacimiento)?,
            gender,
            self.ciudad,
        );
        Ok(Person::from_parts(
            PersonId::new(id.to_hex()),
            data,
            timestamp(self.fecha_registro)?,
            self.fecha_actualizacion.map(timestamp).transpose()?,
        ))
    }
}

/// MongoDB implementation of [`PersonRepository`].
///
/// # Examples
///
/// ```ignore
/// use registro::infrastructure::persistence::mongo::MongoPersonRepository;
///
/// let repo = MongoPersonRepository::connect("mongodb://localhost:27017", "formulario").await?;
/// ```
#[derive(Debug, Clone)]
pub struct MongoPersonRepository {
    collection: Collection<PersonDocument>,
}

impl MongoPersonRepository {
    /// Connects to the server and ensures the unique `dni` index.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Connection` if the client cannot be created
    /// or the index cannot be ensured.
    pub async fn connect(uri: &str, database: &str) -> RepositoryResult<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| RepositoryError::connection(e.to_string()))?;
        let collection = client.database(database).collection(COLLECTION);

        let index = IndexModel::builder()
            .keys(doc! { "dni": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        collection
            .create_index(index)
            .await
            .map_err(|e| RepositoryError::connection(e.to_string()))?;

        Ok(Self { collection })
    }

    async fn national_id_taken(&self, dni: &str, except: Option<ObjectId>) -> RepositoryResult<bool> {
        let mut filter = doc! { "dni": dni };
        if let Some(oid) = except {
            filter.insert("_id", doc! { "$ne": oid });
        }
        let existing = self
            .collection
            .find_one(filter)
            .await
            .map_err(|e| RepositoryError::query(e.to_string()))?;
        Ok(existing.is_some())
    }
}

#[async_trait]
impl PersonRepository for MongoPersonRepository {
    fn backend(&self) -> BackendKind {
        BackendKind::Mongo
    }

    async fn list(&self) -> RepositoryResult<Vec<Person>> {
        let documents: Vec<PersonDocument> = self
            .collection
            .find(Document::new())
            .await
            .map_err(|e| RepositoryError::query(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| RepositoryError::query(e.to_string()))?;

        documents
            .into_iter()
            .map(PersonDocument::try_into_person)
            .collect()
    }

    async fn get(&self, id: &PersonId) -> RepositoryResult<Option<Person>> {
        let Some(oid) = object_id(id) else {
            return Ok(None);
        };
        self.collection
            .find_one(doc! { "_id": oid })
            .await
            .map_err(|e| RepositoryError::query(e.to_string()))?
            .map(PersonDocument::try_into_person)
            .transpose()
    }

    async fn create(&self, data: PersonData) -> RepositoryResult<Person> {
        let dni = data.national_id().as_str();
        if self.national_id_taken(dni, None).await? {
            return Err(RepositoryError::duplicate_national_id(dni));
        }

        let mut document = PersonDocument::new(&data, Timestamp::now());
        let inserted = self
            .collection
            .insert_one(&document)
            .await
            .map_err(|e| map_write_error(e, dni))?;
        document.id = inserted.inserted_id.as_object_id();

        debug!(id = ?document.id, "person inserted into mongo");
        document.try_into_person()
    }

    async fn update(&self, id: &PersonId, data: PersonData) -> RepositoryResult<Person> {
        let dni = data.national_id().as_str();
        let oid = object_id(id);
        if self.national_id_taken(dni, oid).await? {
            return Err(RepositoryError::duplicate_national_id(dni));
        }
        let Some(oid) = oid else {
            return Err(RepositoryError::not_found(id));
        };

        let update = doc! {
            "$set": {
                "dni": dni,
                "nombres": data.first_names(),
                "apellidos": data.last_names(),
                "fechaNacimiento": bson_time(data.birth_date()),
                "genero": data.gender().as_str(),
                "ciudad": data.city(),
                "fechaActualizacion": bson_time(Timestamp::now()),
            }
        };
        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": oid }, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| map_write_error(e, dni))?;

        debug!(id = %id, "person updated in mongo");
        updated
            .ok_or_else(|| RepositoryError::not_found(id))?
            .try_into_person()
    }

    async fn delete(&self, id: &PersonId) -> RepositoryResult<Person> {
        let Some(oid) = object_id(id) else {
            return Err(RepositoryError::not_found(id));
        };
        self.collection
            .find_one_and_delete(doc! { "_id": oid })
            .await
            .map_err(|e| RepositoryError::query(e.to_string()))?
            .ok_or_else(|| RepositoryError::not_found(id))?
            .try_into_person()
    }

    async fn count(&self) -> RepositoryResult<u64> {
        self.collection
            .count_documents(Document::new())
            .await
            .map_err(|e| RepositoryError::query(e.to_string()))
    }
}

fn object_id(id: &PersonId) -> Option<ObjectId> {
    ObjectId::parse_str(id.as_str()).ok()
}

fn bson_time(ts: Timestamp) -> BsonDateTime {
    BsonDateTime::from_millis(ts.timestamp_millis())
}

fn timestamp(value: BsonDateTime) -> RepositoryResult<Timestamp> {
    Timestamp::from_millis(value.timestamp_millis())
        .ok_or_else(|| RepositoryError::serialization("invalid timestamp".to_string()))
}

/// Returns true for server errors caused by the unique `dni` index.
fn is_duplicate_key(err: &MongoError) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) => write.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(command) => command.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

fn map_write_error(err: MongoError, dni: &str) -> RepositoryError {
    if is_duplicate_key(&err) {
        RepositoryError::duplicate_national_id(dni)
    } else {
        RepositoryError::query(err.to_string())
    }
}
