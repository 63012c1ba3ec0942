//! calendar-assistant CLI entry point.

use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;

use calassist_client::cli::{Cli, Command, ConfigAction};
use calassist_client::commands;
use calassist_client::config::{AssistantConfig, Settings};
use calassist_client::error::AssistantResult;
use calassist_client::parse::parse_moment;
use calassist_client::{CalendarAssistant, DateSpec};
use calassist_core::{init_tracing, TracingConfig};
use calassist_providers::{CalendarTransport, LocalStoreTransport, RepositoryRegistry};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AssistantResult<String> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AssistantConfig::default_path);
    let config = AssistantConfig::load_from(&config_path)?;
    let settings = config.settings.merged(&cli.overrides());
    let format = cli.output_format();

    match cli.subcommand() {
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&settings, &config_path),
            ConfigAction::Validate => commands::config::validate(&settings),
            ConfigAction::Path => Ok(commands::config::path(&config_path)),
        },
        Command::Show {
            datespec,
            commitments,
        } => {
            let assistant = open(&settings).await?;
            let spec = DateSpec::parse(&datespec, assistant.today(Utc::now()))?;
            commands::show::run(&assistant, &spec, commitments, format, Utc::now()).await
        }
        Command::Location { datespec } => {
            let assistant = open(&settings).await?;
            let spec = DateSpec::parse(&datespec, assistant.today(Utc::now()))?;
            commands::location::show(&assistant, &spec, format).await
        }
        Command::LocationSet { location, datespec } => {
            let assistant = open(&settings).await?;
            let spec = DateSpec::parse(&datespec, assistant.today(Utc::now()))?;
            commands::location::set(&assistant, &spec, &location, format).await
        }
        Command::Join { time, no_join } => {
            let assistant = open(&settings).await?;
            let at = parse_moment(&time, Utc::now(), &assistant.time_zone())?;
            let outcome = commands::join::run(&assistant, at, &time, format).await?;
            if let (Some(url), false) = (&outcome.url, no_join) {
                commands::join::launch(url)?;
            }
            Ok(outcome.output)
        }
        Command::Availability { datespec, .. } => {
            let min_duration = settings.meeting_length()?;
            let assistant = open(&settings).await?;
            let spec = DateSpec::parse(&datespec, assistant.today(Utc::now()))?;
            commands::availability::run(&assistant, &spec, min_duration, format).await
        }
    }
}

/// Opens the configured calendar in the event store.
async fn open(settings: &Settings) -> AssistantResult<CalendarAssistant> {
    let transport: Arc<dyn CalendarTransport> =
        Arc::new(LocalStoreTransport::new(settings.store_path()));
    let mut registry = RepositoryRegistry::new(transport);
    let repository = registry.get(&settings.calendar_id).await?;
    CalendarAssistant::from_settings(repository, settings)
}
