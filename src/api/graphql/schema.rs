//! # GraphQL Schema
//!
//! Query and mutation roots over the default [`PersonService`].
//!
//! Errors are returned as GraphQL error entries carrying a `code`
//! extension (`VALIDATION`, `DUPLICATE_KEY`, `NOT_FOUND`, `INTERNAL`);
//! validation errors also carry a `fields` map.

use crate::application::error::ApplicationError;
use crate::application::services::PersonService;
use crate::domain::entities::Person;
use crate::domain::validation::PersonInput;
use crate::domain::value_objects::PersonId;
use async_graphql::{
    Context, EmptySubscription, Error, ErrorExtensions, ID, Object, Result, Schema, SimpleObject,
    Value,
};
use std::collections::BTreeMap;

/// The executable schema.
pub type RegistroSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Builds the schema with `service` as shared data.
#[must_use]
pub fn build_schema(service: PersonService) -> RegistroSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(service)
        .finish()
}

/// A person as exposed over GraphQL. Dates are ISO-8601 strings.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Usuario")]
pub struct UsuarioObject {
    /// Record id.
    pub id: ID,
    /// DNI.
    pub national_id: String,
    /// First names.
    pub first_names: String,
    /// Last names.
    pub last_names: String,
    /// Birth date.
    pub birth_date: String,
    /// Masculino, Femenino or Otro.
    pub gender: String,
    /// City.
    pub city: String,
    /// Registration time.
    pub registered_at: String,
    /// Last update time.
    pub updated_at: Option<String>,
}

impl From<Person> for UsuarioObject {
    fn from(person: Person) -> Self {
        let data = person.data();
        Self {
            id: ID(person.id().to_string()),
            national_id: data.national_id().to_string(),
            first_names: data.first_names().to_string(),
            last_names: data.last_names().to_string(),
            birth_date: data.birth_date().to_iso_string(),
            gender: data.gender().to_string(),
            city: data.city().to_string(),
            registered_at: person.registered_at().to_iso_string(),
            updated_at: person.updated_at().map(|t| t.to_iso_string()),
        }
    }
}

/// Converts an application error, hiding unexpected failures behind `fallback`.
fn to_graphql_error(err: ApplicationError, fallback: &str) -> Error {
    let code = err.code();
    let fields = err.validation_errors().map(|errors| {
        errors
            .iter()
            .map(|(field, message)| (field.as_str().to_string(), message.to_string()))
            .collect::<BTreeMap<_, _>>()
    });
    let message = if err.is_unexpected() {
        fallback.to_string()
    } else {
        err.to_string()
    };

    Error::new(message).extend_with(|_, ext| {
        ext.set("code", code);
        if let Some(fields) = &fields {
            if let Ok(value) = Value::from_json(serde_json::json!(fields)) {
                ext.set("fields", value);
            }
        }
    })
}

fn person_input(
    national_id: String,
    first_names: String,
    last_names: String,
    birth_date: String,
    gender: String,
    city: String,
) -> PersonInput {
    PersonInput::new(
        national_id,
        first_names,
        last_names,
        birth_date,
        gender,
        city,
    )
}

/// Read operations.
#[derive(Debug, Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// All registered people.
    async fn usuarios(&self, ctx: &Context<'_>) -> Result<Vec<UsuarioObject>> {
        let service = ctx.data::<PersonService>()?;
        let people = service
            .list()
            .await
            .map_err(|e| to_graphql_error(e, "Error al obtener usuarios"))?;
        Ok(people.into_iter().map(UsuarioObject::from).collect())
    }

    /// One person, or null if there is no record with this id.
    async fn usuario(&self, ctx: &Context<'_>, id: ID) -> Result<Option<UsuarioObject>> {
        let service = ctx.data::<PersonService>()?;
        let person = service
            .find(&PersonId::new(id.0))
            .await
            .map_err(|e| to_graphql_error(e, "Error al obtener usuario"))?;
        Ok(person.map(UsuarioObject::from))
    }
}

/// Write operations.
#[derive(Debug, Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Registers a person.
    #[allow(clippy::too_many_arguments)]
    async fn crear_usuario(
        &self,
        ctx: &Context<'_>,
        national_id: String,
        first_names: String,
        last_names: String,
        birth_date: String,
        gender: String,
        city: String,
    ) -> Result<UsuarioObject> {
        let service = ctx.data::<PersonService>()?;
        let input = person_input(national_id, first_names, last_names, birth_date, gender, city);
        let person = service
            .create(&input)
            .await
            .map_err(|e| to_graphql_error(e, "Error al crear usuario"))?;
        Ok(person.into())
    }

    /// Replaces every field of a person.
    #[allow(clippy::too_many_arguments)]
    async fn actualizar_usuario(
        &self,
        ctx: &Context<'_>,
        id: ID,
        national_id: String,
        first_names: String,
        last_names: String,
        birth_date: String,
        gender: String,
        city: String,
    ) -> Result<UsuarioObject> {
        let service = ctx.data::<PersonService>()?;
        let input = person_input(national_id, first_names, last_names, birth_date, gender, city);
        let person = service
            .update(&PersonId::new(id.0), &input)
            .await
            .map_err(|e| to_graphql_error(e, "Error al actualizar usuario"))?;
        Ok(person.into())
    }

    /// Deletes a person. Returns true on success.
    async fn eliminar_usuario(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let service = ctx.data::<PersonService>()?;
        service
            .delete(&PersonId::new(id.0))
            .await
            .map_err(|e| to_graphql_error(e, "Error al eliminar usuario"))?;
        Ok(true)
    }
}
