//! Device model repository resolution.
//!
//! Resolves DTMIs into their model documents plus the transitive closure of
//! model dependencies, reading from a local directory tree or a remote HTTP
//! repository laid out as `dtmi/<segment>/.../<name>-<version>.json`.

pub mod client;
pub mod dtmi;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod messages;
pub mod repository;
pub mod resolve;
pub mod resolved;
pub mod settings;
pub mod sink;

pub use client::ResolverClient;
pub use dtmi::{is_valid_dtmi, to_path, Dtmi, InvalidDtmi};
pub use error::{DependencyFailure, ResolverError, ResolverErrorKind};
pub use extract::{extract_dependencies, ExtractError};
pub use fetch::{FetchError, FetcherKind, LocalFetcher, ModelFetcher, RemoteFetcher};
pub use repository::RepositoryLocation;
pub use resolved::ResolvedModels;
pub use settings::{
    DependencyResolution, RemoteFetcherConfig, ResolverSettings, DEFAULT_REPOSITORY,
};
pub use sink::{EventLevel, NoopSink, RecordedEvent, RecordingSink, ResolverEventSink, TracingSink};
