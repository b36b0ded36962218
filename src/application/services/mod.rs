//! # Application Services
//!
//! Services that orchestrate validation and persistence.
//!
//! - [`PersonService`]: CRUD use cases over one backend
//! - [`BackendRegistry`]: every connected backend and the default

pub mod registration;
pub mod registry;

pub use registration::PersonService;
pub use registry::BackendRegistry;
