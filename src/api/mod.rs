//! # API Layer
//!
//! HTTP transports over the application services.
//!
//! - [`rest`]: JSON resource routes
//! - [`graphql`]: GraphQL endpoint

pub mod graphql;
pub mod rest;
