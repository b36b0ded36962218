//! Command-line client for a running registration server.

use anyhow::{Context, bail};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use registro::client::{
    FormController, GraphqlClient, PersonApi, RegistrationForm, RestClient,
};
use registro::domain::entities::Person;
use registro::domain::validation::Field;
use registro::domain::value_objects::{PersonId, Timestamp};
use registro::infrastructure::persistence::BackendKind;
use std::io::{BufRead, Write};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transport {
    Rest,
    Graphql,
}

/// Registration client.
#[derive(Debug, Parser)]
#[command(name = "registro-cli", version)]
struct Cli {
    /// Server base URL.
    #[arg(long, default_value = "http://localhost:5000")]
    server: String,

    /// Storage backend to target (REST only); the server default when omitted.
    #[arg(long)]
    backend: Option<BackendKind>,

    /// API to use.
    #[arg(long, value_enum, default_value = "rest")]
    transport: Transport,

    /// Request timeout in milliseconds.
    #[arg(long, default_value_t = 5_000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every record.
    List,
    /// Register a person.
    Create(PersonArgs),
    /// Replace a record's fields.
    Update {
        /// Record id.
        id: String,
        #[command(flatten)]
        person: PersonArgs,
    },
    /// Delete a record.
    Delete {
        /// Record id.
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, ClapArgs)]
struct PersonArgs {
    /// DNI (8 to 10 digits).
    #[arg(long)]
    dni: String,
    /// First names.
    #[arg(long)]
    nombres: String,
    /// Last names.
    #[arg(long)]
    apellidos: String,
    /// Birth date, YYYY-MM-DD.
    #[arg(long)]
    fecha_nacimiento: String,
    /// Masculino, Femenino or Otro.
    #[arg(long)]
    genero: String,
    /// City.
    #[arg(long)]
    ciudad: String,
}

impl PersonArgs {
    fn fill(&self, form: &mut RegistrationForm) {
        form.set_field(Field::NationalId, &self.dni);
        form.set_field(Field::FirstNames, &self.nombres);
        form.set_field(Field::LastNames, &self.apellidos);
        form.set_field(Field::BirthDate, &self.fecha_nacimiento);
        form.set_field(Field::Gender, &self.genero);
        form.set_field(Field::City, &self.ciudad);
    }
}

fn build_api(cli: &Cli) -> anyhow::Result<Arc<dyn PersonApi>> {
    let api: Arc<dyn PersonApi> = match cli.transport {
        Transport::Rest => Arc::new(RestClient::for_backend(&cli.server, cli.backend, cli.timeout_ms)?),
        Transport::Graphql => {
            if cli.backend.is_some() {
                bail!("--backend is only supported with --transport rest");
            }
            let endpoint = format!("{}/graphql", cli.server.trim_end_matches('/'));
            Arc::new(GraphqlClient::new(endpoint, cli.timeout_ms)?)
        }
    };
    Ok(api)
}

fn print_person(person: &Person) {
    let data = person.data();
    println!(
        "{:>24}  {:<10}  {:<20}  {:<20}  {}  {:<9}  {}",
        person.id(),
        data.national_id(),
        data.first_names(),
        data.last_names(),
        data.birth_date().to_date_string(),
        data.gender(),
        data.city(),
    );
}

fn print_form_errors(form: &RegistrationForm) {
    for (field, message) in form.errors().iter() {
        eprintln!("  {}: {message}", field.as_str());
    }
}

fn confirm(prompt: &str) -> bool {
    print!("{prompt} [s/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "s" | "si" | "sí" | "y" | "yes")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let api = build_api(&cli)?;
    let target = cli
        .backend
        .map_or_else(|| "default".to_string(), |kind| kind.to_string());
    let mut controller = FormController::new(target, api);
    let now = Timestamp::now();

    let outcome = match &cli.command {
        Command::List => {
            controller.refresh(now).await.context("failed to list records")?;
            for person in controller.records() {
                print_person(person);
            }
            Ok(())
        }
        Command::Create(person) => {
            person.fill(controller.form_mut()?);
            controller.submit(now).await.map(|p| print_person(&p))
        }
        Command::Update { id, person } => {
            controller.refresh(now).await.context("failed to load records")?;
            controller.start_edit(&PersonId::new(id.as_str()))?;
            person.fill(controller.form_mut()?);
            controller.submit(now).await.map(|p| print_person(&p))
        }
        Command::Delete { id, yes } => {
            let skip_prompt = *yes;
            controller
                .delete(&PersonId::new(id.as_str()), |prompt| skip_prompt || confirm(prompt), now)
                .await
                .map(|_| ())
        }
    };

    if let Some(message) = controller.banner().visible_at(Timestamp::now()) {
        println!("{}", message.text);
    }
    if outcome.is_err() {
        print_form_errors(controller.form()?);
    }
    outcome.context("request failed")
}
