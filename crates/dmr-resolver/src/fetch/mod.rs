//! Content fetch capability and its local/remote implementations.

use async_trait::async_trait;
use thiserror::Error;

mod local;
mod remote;

pub use local::LocalFetcher;
pub use remote::RemoteFetcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `FetcherKind` values.
pub enum FetcherKind {
    Local,
    Remote,
}

impl FetcherKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FetcherKind::Local => "local",
            FetcherKind::Remote => "remote",
        }
    }
}

impl std::fmt::Display for FetcherKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
/// Failure reported by a `ModelFetcher`. `NotFound` is kept distinct from
/// every other fault.
pub enum FetchError {
    #[error("model content not found at \"{path}\"")]
    NotFound { path: String },
    #[error("failed to read model content at \"{path}\": {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("request to \"{url}\" returned status {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("request to \"{url}\" failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("resolution was cancelled")]
    Cancelled,
    #[error("resolution timed out after {timeout_ms}ms")]
    TimedOut { timeout_ms: u64 },
    #[error("invalid repository location \"{location}\": {reason}")]
    InvalidLocation { location: String, reason: String },
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
    }
}

#[async_trait]
/// Trait contract for reading model documents out of a repository root.
///
/// Relative paths always use `/` separators, as produced by
/// [`crate::dtmi::Dtmi::to_relative_path`].
pub trait ModelFetcher: Send + Sync {
    fn kind(&self) -> FetcherKind;

    /// URI scheme of the repository root (`file`, `https`, ...).
    fn scheme(&self) -> &str;

    /// Full location of `relative_path`, as reported in diagnostics.
    fn locate(&self, relative_path: &str) -> String;

    async fn fetch(&self, relative_path: &str) -> Result<String, FetchError>;
}
