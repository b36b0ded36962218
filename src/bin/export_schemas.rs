//! Prints the GraphQL SDL and the JSON Schemas of the REST payloads.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use registro::api::graphql::build_schema;
use registro::application::services::PersonService;
use registro::domain::entities::Person;
use registro::domain::validation::PersonInput;
use registro::infrastructure::persistence::InMemoryPersonRepository;
use schemars::schema_for;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// GraphQL SDL.
    Graphql,
    /// JSON Schema for the REST request and response bodies.
    Json,
    /// Both.
    All,
}

/// Export API schemas.
#[derive(Debug, Parser)]
#[command(name = "export_schemas", version)]
struct Args {
    /// Which schemas to print.
    #[arg(long, value_enum, default_value = "all")]
    format: Format,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if matches!(args.format, Format::Graphql | Format::All) {
        let schema = build_schema(PersonService::new(Arc::new(InMemoryPersonRepository::new())));
        println!("{}", schema.sdl());
    }

    if matches!(args.format, Format::Json | Format::All) {
        let schemas = serde_json::json!({
            "PersonInput": schema_for!(PersonInput),
            "Person": schema_for!(Person),
        });
        let rendered = serde_json::to_string_pretty(&schemas).context("failed to render JSON schema")?;
        println!("{rendered}");
    }

    Ok(())
}
