//! Resolution settings and transport defaults.

use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_REPOSITORY: &str = "https://devicemodels.azure.com";
pub const DEFAULT_REMOTE_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_USER_AGENT: &str = concat!("dmr-resolver/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// How far a resolution call follows model dependencies.
pub enum DependencyResolution {
    /// Return exactly the requested models.
    Disabled,
    /// Follow dependencies, fetching each model individually.
    #[default]
    Enabled,
    /// Prefer the pre-expanded bundle of each model; fall back to individual
    /// fetches when no bundle exists.
    FromExpanded,
}

impl DependencyResolution {
    pub fn as_str(self) -> &'static str {
        match self {
            DependencyResolution::Disabled => "disabled",
            DependencyResolution::Enabled => "enabled",
            DependencyResolution::FromExpanded => "expanded",
        }
    }
}

impl std::fmt::Display for DependencyResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid dependency resolution mode '{0}'; expected disabled|enabled|expanded")]
pub struct DependencyResolutionParseError(pub String);

impl FromStr for DependencyResolution {
    type Err = DependencyResolutionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "disabled" => Ok(Self::Disabled),
            "enabled" => Ok(Self::Enabled),
            "expanded" | "from_expanded" | "fromexpanded" => Ok(Self::FromExpanded),
            _ => Err(DependencyResolutionParseError(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `RemoteFetcherConfig` used when talking to HTTP repositories.
pub struct RemoteFetcherConfig {
    pub request_timeout_ms: u64,
    pub user_agent: String,
}

impl Default for RemoteFetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: DEFAULT_REMOTE_REQUEST_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Immutable inputs for every resolution call made by one client.
pub struct ResolverSettings {
    pub dependency_resolution: DependencyResolution,
    /// Upper bound for a whole resolution call; `None` disables the bound.
    pub call_timeout_ms: Option<u64>,
    pub remote: RemoteFetcherConfig,
}

impl ResolverSettings {
    pub fn new(dependency_resolution: DependencyResolution) -> Self {
        Self {
            dependency_resolution,
            ..Self::default()
        }
    }

    pub fn with_call_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.call_timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_remote(mut self, remote: RemoteFetcherConfig) -> Self {
        self.remote = remote;
        self
    }
}
