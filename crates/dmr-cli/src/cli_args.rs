use clap::{Args, Parser, Subcommand};
use dmr_resolver::{DependencyResolution, DEFAULT_REPOSITORY};

use crate::CliOutputFormat;

fn parse_dependency_resolution(value: &str) -> Result<DependencyResolution, String> {
    value
        .parse::<DependencyResolution>()
        .map_err(|error| error.to_string())
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "dmr",
    about = "Resolve device models and their dependencies from a model repository",
    version
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub(crate) enum CliCommand {
    /// Resolve one or more DTMIs and print the resolved models as JSON.
    Resolve(ResolveArgs),
    /// Print the repository location of a DTMI's model document.
    Path(PathArgs),
    /// Check DTMI syntax without touching any repository.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
pub(crate) struct RepositoryArgs {
    #[arg(
        long,
        env = "DMR_REPOSITORY",
        default_value = DEFAULT_REPOSITORY,
        help = "Repository root: an http(s) URL, a file:// URI, or a local directory"
    )]
    pub(crate) repository: String,
}

#[derive(Debug, Args)]
pub(crate) struct ResolveArgs {
    #[command(flatten)]
    pub(crate) repository: RepositoryArgs,

    #[arg(required = true, help = "DTMIs to resolve, e.g. dtmi:com:example:Thermostat;1")]
    pub(crate) dtmis: Vec<String>,

    #[arg(
        long,
        env = "DMR_DEPS",
        default_value = "enabled",
        value_parser = parse_dependency_resolution,
        help = "Dependency handling (disabled|enabled|expanded): disabled returns only the requested models, expanded prefers pre-expanded bundles"
    )]
    pub(crate) deps: DependencyResolution,

    #[arg(
        long = "timeout-ms",
        env = "DMR_TIMEOUT_MS",
        value_parser = parse_positive_u64,
        help = "Upper bound for the whole resolution call in milliseconds"
    )]
    pub(crate) timeout_ms: Option<u64>,

    #[arg(long, value_enum, default_value_t = CliOutputFormat::Pretty)]
    pub(crate) output: CliOutputFormat,
}

#[derive(Debug, Args)]
pub(crate) struct PathArgs {
    #[command(flatten)]
    pub(crate) repository: RepositoryArgs,

    pub(crate) dtmi: String,

    #[arg(long, help = "Print the expanded bundle location instead")]
    pub(crate) expanded: bool,
}

#[derive(Debug, Args)]
pub(crate) struct ValidateArgs {
    #[arg(required = true)]
    pub(crate) dtmis: Vec<String>,
}
