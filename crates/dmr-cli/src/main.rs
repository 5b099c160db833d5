mod cli_args;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use dmr_resolver::{
    RepositoryLocation, ResolvedModels, ResolverClient, ResolverSettings, TracingSink,
};
use serde_json::{Map, Value};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli_args::{Cli, CliCommand, PathArgs, ResolveArgs, ValidateArgs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliOutputFormat {
    Pretty,
    Compact,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        CliCommand::Resolve(args) => run_resolve(&args).await,
        CliCommand::Path(args) => run_path(&args),
        CliCommand::Validate(args) => run_validate(&args),
    }
}

async fn run_resolve(args: &ResolveArgs) -> Result<()> {
    let client = build_client(&args.repository.repository, resolver_settings(args))?;
    tracing::debug!(
        repository = %client.repository_uri(),
        mode = %client.settings().dependency_resolution,
        "resolving {} model(s)",
        args.dtmis.len()
    );
    let models = client.resolve_many(args.dtmis.iter().cloned()).await?;
    println!("{}", render_models(&models, args.output)?);
    Ok(())
}

fn run_path(args: &PathArgs) -> Result<()> {
    let client = build_client(&args.repository.repository, ResolverSettings::default())?;
    let path = if args.expanded {
        client.get_expanded_path(&args.dtmi)?
    } else {
        client.get_path(&args.dtmi)?
    };
    println!("{path}");
    Ok(())
}

fn run_validate(args: &ValidateArgs) -> Result<()> {
    let invalid = args
        .dtmis
        .iter()
        .filter(|dtmi| !ResolverClient::is_valid_dtmi(dtmi))
        .collect::<Vec<_>>();
    for dtmi in &args.dtmis {
        let verdict = if invalid.contains(&dtmi) { "invalid" } else { "valid" };
        println!("{dtmi}\t{verdict}");
    }
    if !invalid.is_empty() {
        bail!("{} of {} DTMI(s) are invalid", invalid.len(), args.dtmis.len());
    }
    Ok(())
}

fn resolver_settings(args: &ResolveArgs) -> ResolverSettings {
    let settings = ResolverSettings::new(args.deps);
    match args.timeout_ms {
        Some(timeout_ms) => settings.with_call_timeout_ms(timeout_ms),
        None => settings,
    }
}

fn build_client(repository: &str, settings: ResolverSettings) -> Result<ResolverClient> {
    let location = RepositoryLocation::parse(repository)
        .with_context(|| format!("invalid repository '{repository}'"))?;
    ResolverClient::with_sink(location, settings, Arc::new(TracingSink))
        .with_context(|| format!("failed to create client for '{repository}'"))
}

/// Renders resolved models as one JSON object keyed by DTMI, embedding each
/// model document as JSON rather than as an escaped string.
fn render_models(models: &ResolvedModels, format: CliOutputFormat) -> Result<String> {
    let mut rendered = Map::new();
    for (dtmi, content) in models.iter() {
        let document = serde_json::from_str::<Value>(content)
            .with_context(|| format!("model content for '{dtmi}' is not valid JSON"))?;
        rendered.insert(dtmi.to_string(), document);
    }
    let rendered = Value::Object(rendered);
    let text = match format {
        CliOutputFormat::Pretty => serde_json::to_string_pretty(&rendered)?,
        CliOutputFormat::Compact => serde_json::to_string(&rendered)?,
    };
    Ok(text)
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
