//! # Client
//!
//! Headless registration client: form state, status banner, and HTTP
//! clients for the REST and GraphQL APIs.
//!
//! - [`RegistrationForm`]: draft fields and their errors
//! - [`StatusBanner`]: transient success/error message
//! - [`PersonApi`]: remote CRUD, implemented by [`RestClient`] and [`GraphqlClient`]
//! - [`FormController`]: ties the above together per backend target

pub mod api;
pub mod banner;
pub mod controller;
pub mod error;
pub mod form;
pub mod graphql;
pub mod rest;

pub use api::{ClientResult, PersonApi};
pub use banner::{BANNER_TTL_MS, BannerKind, BannerMessage, StatusBanner};
pub use controller::{CONFIRM_DELETE, FormController};
pub use error::{ClientError, FORM_INVALID};
pub use form::RegistrationForm;
pub use graphql::GraphqlClient;
pub use rest::RestClient;
