//! # Form Controller
//!
//! Drives the registration form against one or more named API targets
//! (typically one per storage backend). Each target keeps its own record
//! list, form draft and editing id, so switching the active target never
//! loses in-progress edits on another.

use crate::application::services::registration::NOT_FOUND;
use crate::client::api::{ClientResult, PersonApi};
use crate::client::banner::StatusBanner;
use crate::client::error::ClientError;
use crate::client::form::RegistrationForm;
use crate::domain::entities::Person;
use crate::domain::value_objects::{PersonId, Timestamp};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Prompt shown before deleting a record.
pub const CONFIRM_DELETE: &str = "¿Está seguro de eliminar este usuario?";

const SAVE_FAILED: &str = "Error al guardar usuario";
const DELETE_FAILED: &str = "Error al eliminar usuario";

/// State kept per target.
#[derive(Debug)]
struct Target {
    api: Arc<dyn PersonApi>,
    records: Vec<Person>,
    form: RegistrationForm,
    editing: Option<PersonId>,
}

/// Form controller over named targets.
#[derive(Debug)]
pub struct FormController {
    targets: BTreeMap<String, Target>,
    active: String,
    banner: StatusBanner,
}

impl FormController {
    /// Creates a controller whose first (and active) target is `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, api: Arc<dyn PersonApi>) -> Self {
        let name = name.into();
        let mut controller = Self {
            targets: BTreeMap::new(),
            active: name.clone(),
            banner: StatusBanner::new(),
        };
        controller.add_target(name, api);
        controller
    }

    /// Adds (or replaces) a target.
    pub fn add_target(&mut self, name: impl Into<String>, api: Arc<dyn PersonApi>) {
        self.targets.insert(
            name.into(),
            Target {
                api,
                records: Vec::new(),
                form: RegistrationForm::new(),
                editing: None,
            },
        );
    }

    /// Switches the active target.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if no target has this name.
    pub fn set_active(&mut self, name: &str) -> ClientResult<()> {
        if !self.targets.contains_key(name) {
            return Err(ClientError::Config(format!("unknown target '{name}'")));
        }
        self.active = name.to_string();
        Ok(())
    }

    /// Returns the active target's name.
    #[must_use]
    pub fn active(&self) -> &str {
        &self.active
    }

    /// Returns the target names.
    pub fn target_names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    fn target(&self) -> ClientResult<&Target> {
        self.targets
            .get(&self.active)
            .ok_or_else(|| ClientError::Config(format!("unknown target '{}'", self.active)))
    }

    fn target_mut(&mut self) -> ClientResult<&mut Target> {
        let active = self.active.clone();
        self.targets
            .get_mut(&active)
            .ok_or_else(|| ClientError::Config(format!("unknown target '{active}'")))
    }

    /// Returns the records last loaded for the active target.
    #[must_use]
    pub fn records(&self) -> &[Person] {
        self.target().map(|t| t.records.as_slice()).unwrap_or(&[])
    }

    /// Returns the records last loaded for a named target.
    #[must_use]
    pub fn records_of(&self, name: &str) -> Option<&[Person]> {
        self.targets.get(name).map(|t| t.records.as_slice())
    }

    /// Returns the active form.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if the active target is missing.
    pub fn form(&self) -> ClientResult<&RegistrationForm> {
        self.target().map(|t| &t.form)
    }

    /// Returns the active form for editing.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if the active target is missing.
    pub fn form_mut(&mut self) -> ClientResult<&mut RegistrationForm> {
        self.target_mut().map(|t| &mut t.form)
    }

    /// Returns the id being edited on the active target.
    #[must_use]
    pub fn editing(&self) -> Option<&PersonId> {
        self.target().ok().and_then(|t| t.editing.as_ref())
    }

    /// Returns the banner.
    #[must_use]
    pub fn banner(&self) -> &StatusBanner {
        &self.banner
    }

    /// Loads a listed record into the active form for editing.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Rejected` if the record is not in the loaded list.
    pub fn start_edit(&mut self, id: &PersonId) -> ClientResult<()> {
        let target = self.target_mut()?;
        let person = target
            .records
            .iter()
            .find(|p| p.id() == id)
            .cloned()
            .ok_or_else(|| ClientError::rejected(NOT_FOUND))?;
        target.form.fill_from(&person);
        target.editing = Some(person.id().clone());
        Ok(())
    }

    /// Leaves edit mode and clears the active form.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if the active target is missing.
    pub fn cancel_edit(&mut self) -> ClientResult<()> {
        let target = self.target_mut()?;
        target.form.reset();
        target.editing = None;
        Ok(())
    }

    /// Reloads the active target's records.
    ///
    /// # Errors
    ///
    /// Returns the API error; the banner shows it too.
    pub async fn refresh(&mut self, now: Timestamp) -> ClientResult<()> {
        let name = self.active.clone();
        let api = Arc::clone(&self.target()?.api);
        let result = api.list().await;
        self.store_list(&name, result, now)
    }

    /// Reloads every target concurrently.
    ///
    /// Failures are shown on the banner; the other targets still update.
    pub async fn refresh_all(&mut self, now: Timestamp) {
        let apis: Vec<(String, Arc<dyn PersonApi>)> = self
            .targets
            .iter()
            .map(|(name, target)| (name.clone(), Arc::clone(&target.api)))
            .collect();
        let results = join_all(apis.into_iter().map(|(name, api)| async move {
            let result = api.list().await;
            (name, result)
        }))
        .await;

        for (name, result) in results {
            if let Err(err) = self.store_list(&name, result, now) {
                debug!(target_name = %name, error = %err, "refresh failed");
            }
        }
    }

    fn store_list(
        &mut self,
        name: &str,
        result: ClientResult<Vec<Person>>,
        now: Timestamp,
    ) -> ClientResult<()> {
        match result {
            Ok(records) => {
                if let Some(target) = self.targets.get_mut(name) {
                    target.records = records;
                }
                Ok(())
            }
            Err(err) => {
                warn!(target_name = %name, error = %err, "failed to load records");
                self.banner
                    .error(format!("Error al cargar usuarios de {name}"), now);
                Err(err)
            }
        }
    }

    /// Submits the active form: creates, or updates the record being edited.
    ///
    /// Local validation runs first; on failure nothing is sent. On success
    /// the form and editing id are cleared and the list is reloaded.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidForm` for local validation failures, or
    /// the API error. Either way the banner shows the message.
    pub async fn submit(&mut self, now: Timestamp) -> ClientResult<Person> {
        let name = self.active.clone();
        let target = self.target_mut()?;

        if let Err(errors) = target.form.validate(now) {
            let err = ClientError::InvalidForm(errors);
            self.banner.error(err.user_message(SAVE_FAILED), now);
            return Err(err);
        }

        let input = target.form.to_input();
        let api = Arc::clone(&target.api);
        let editing = target.editing.clone();

        let result = match &editing {
            Some(id) => api.update(id, &input).await,
            None => api.create(&input).await,
        };

        match result {
            Ok(person) => {
                let target = self.target_mut()?;
                target.form.reset();
                target.editing = None;

                let verb = if editing.is_some() { "actualizado" } else { "creado" };
                self.banner.success(format!("Usuario {verb} en {name}"), now);
                // A failed reload replaces the success message.
                if let Err(err) = self.refresh(now).await {
                    debug!(error = %err, "reload after save failed");
                }
                Ok(person)
            }
            Err(err) => {
                if let ClientError::Rejected { fields, .. } = &err {
                    self.target_mut()?.form.apply_server_errors(fields);
                }
                self.banner.error(err.user_message(SAVE_FAILED), now);
                Err(err)
            }
        }
    }

    /// Deletes a record from the active target after `confirm` approves it.
    ///
    /// Returns `Ok(false)` if the user declined. If the deleted record was
    /// being edited, edit mode is left.
    ///
    /// # Errors
    ///
    /// Returns the API error; the banner shows it too.
    pub async fn delete<F>(&mut self, id: &PersonId, confirm: F, now: Timestamp) -> ClientResult<bool>
    where
        F: FnOnce(&str) -> bool,
    {
        if !confirm(CONFIRM_DELETE) {
            return Ok(false);
        }

        let name = self.active.clone();
        let api = Arc::clone(&self.target()?.api);
        if let Err(err) = api.delete(id).await {
            self.banner.error(err.user_message(DELETE_FAILED), now);
            return Err(err);
        }

        let target = self.target_mut()?;
        if target.editing.as_ref() == Some(id) {
            target.form.reset();
            target.editing = None;
        }
        self.banner.success(format!("Usuario eliminado de {name}"), now);
        if let Err(err) = self.refresh(now).await {
            debug!(error = %err, "reload after delete failed");
        }
        Ok(true)
    }
}
