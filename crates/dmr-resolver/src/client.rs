//! Caller-facing resolver client.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;

use crate::{
    dtmi::{self, Dtmi},
    error::{ResolverError, ResolverErrorKind},
    fetch::{FetchError, ModelFetcher},
    messages,
    repository::RepositoryLocation,
    resolve::resolve_models,
    resolved::ResolvedModels,
    settings::{ResolverSettings, DEFAULT_REPOSITORY},
    sink::{NoopSink, ResolverEventSink},
};

/// Resolves model identifiers against one repository root.
///
/// The client holds no per-call state, so concurrent calls on the same
/// client are independent of each other.
pub struct ResolverClient {
    location: RepositoryLocation,
    settings: ResolverSettings,
    fetcher: Arc<dyn ModelFetcher>,
    sink: Arc<dyn ResolverEventSink>,
}

impl ResolverClient {
    pub fn new(location: RepositoryLocation, settings: ResolverSettings) -> Result<Self, FetchError> {
        Self::with_sink(location, settings, Arc::new(NoopSink))
    }

    pub fn with_sink(
        location: RepositoryLocation,
        settings: ResolverSettings,
        sink: Arc<dyn ResolverEventSink>,
    ) -> Result<Self, FetchError> {
        let fetcher = location.fetcher(&settings.remote)?;
        Ok(Self::with_fetcher(location, settings, fetcher, sink))
    }

    /// Uses a caller-supplied fetch capability instead of the one implied by
    /// `location`'s scheme.
    pub fn with_fetcher(
        location: RepositoryLocation,
        settings: ResolverSettings,
        fetcher: Arc<dyn ModelFetcher>,
        sink: Arc<dyn ResolverEventSink>,
    ) -> Self {
        sink.trace(&messages::client_init_with_fetcher(fetcher.scheme()));
        Self {
            location,
            settings,
            fetcher,
            sink,
        }
    }

    pub fn from_local_repository(path: impl AsRef<Path>) -> Result<Self, FetchError> {
        Self::new(RepositoryLocation::local(path)?, ResolverSettings::default())
    }

    pub fn from_remote_repository(url: &str) -> Result<Self, FetchError> {
        Self::new(RepositoryLocation::remote(url)?, ResolverSettings::default())
    }

    pub fn from_uri(value: &str) -> Result<Self, FetchError> {
        Self::new(RepositoryLocation::parse(value)?, ResolverSettings::default())
    }

    /// Client for the public model repository.
    pub fn public_repository() -> Result<Self, FetchError> {
        Self::from_remote_repository(DEFAULT_REPOSITORY)
    }

    pub async fn resolve(&self, dtmi: &str) -> Result<ResolvedModels, ResolverError> {
        self.resolve_many([dtmi]).await
    }

    pub async fn resolve_many<I, S>(&self, dtmis: I) -> Result<ResolvedModels, ResolverError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resolve_with_cancel(dtmis, std::future::pending::<()>())
            .await
    }

    /// Resolves `dtmis`, aborting the whole call once `cancel` completes or
    /// the configured call timeout elapses.
    pub async fn resolve_with_cancel<I, S, F>(
        &self,
        dtmis: I,
        cancel: F,
    ) -> Result<ResolvedModels, ResolverError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Future<Output = ()>,
    {
        let requested = dtmis.into_iter().map(Into::into).collect::<Vec<String>>();
        let origin = requested.first().cloned().unwrap_or_default();
        let call = resolve_models(
            self.fetcher.as_ref(),
            self.sink.as_ref(),
            self.settings.dependency_resolution,
            &requested,
        );
        let bounded = async {
            match self.settings.call_timeout_ms {
                Some(timeout_ms) => tokio::time::timeout(Duration::from_millis(timeout_ms), call)
                    .await
                    .unwrap_or_else(|_| {
                        Err(ResolverError::new(
                            origin.clone(),
                            ResolverErrorKind::Fetch(FetchError::TimedOut { timeout_ms }),
                        ))
                    }),
                None => call.await,
            }
        };

        tokio::select! {
            biased;
            result = bounded => result,
            () = cancel => Err(ResolverError::new(
                origin.clone(),
                ResolverErrorKind::Fetch(FetchError::Cancelled),
            )),
        }
    }

    /// Full location of the model document for `dtmi` in this repository.
    pub fn get_path(&self, dtmi: &str) -> Result<String, ResolverError> {
        self.locate(dtmi, false)
    }

    /// Full location of the expanded bundle for `dtmi` in this repository.
    pub fn get_expanded_path(&self, dtmi: &str) -> Result<String, ResolverError> {
        self.locate(dtmi, true)
    }

    pub fn is_valid_dtmi(value: &str) -> bool {
        dtmi::is_valid_dtmi(value)
    }

    pub fn repository_uri(&self) -> &Url {
        self.location.uri()
    }

    pub fn location(&self) -> &RepositoryLocation {
        &self.location
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    fn locate(&self, dtmi: &str, expanded: bool) -> Result<String, ResolverError> {
        let parsed = Dtmi::parse(dtmi).map_err(|error| {
            ResolverError::new(
                dtmi,
                ResolverErrorKind::InvalidDtmiFormat { dtmi: error.0 },
            )
        })?;
        Ok(self.fetcher.locate(&parsed.to_relative_path(expanded)))
    }
}

impl std::fmt::Debug for ResolverClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverClient")
            .field("location", &self.location)
            .field("settings", &self.settings)
            .field("fetcher", &self.fetcher.kind())
            .finish()
    }
}
