//! Breadth-first resolution of requested identifiers and their closure.
//!
//! Each identifier is fetched at most once per call. Processing, result
//! insertion and event emission all follow queue order, so two calls against
//! the same repository emit identical event sequences. The first failure ends
//! the call; no partial result is returned.

use std::collections::{HashSet, VecDeque};

use crate::{
    dtmi::Dtmi,
    error::{DependencyFailure, ResolverError, ResolverErrorKind},
    extract::{extract_dependencies, model_id, split_expanded, BundledModel},
    fetch::{FetchError, FetcherKind, ModelFetcher},
    messages,
    resolved::ResolvedModels,
    settings::DependencyResolution,
    sink::ResolverEventSink,
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct WorkItem {
    dtmi: String,
    /// Model whose document referenced this one; `None` for requested roots.
    parent: Option<String>,
}

impl WorkItem {
    fn root(dtmi: &str) -> Self {
        Self {
            dtmi: dtmi.to_string(),
            parent: None,
        }
    }

    fn dependency(dtmi: String, parent: &str) -> Self {
        Self {
            dtmi,
            parent: Some(parent.to_string()),
        }
    }

    fn fail(&self, kind: ResolverErrorKind) -> ResolverError {
        match &self.parent {
            Some(parent) if kind.wraps_as_dependency() => ResolverError::new(
                parent.clone(),
                ResolverErrorKind::DependencyResolution(DependencyFailure::Unresolvable {
                    dependency: self.dtmi.clone(),
                    cause: Box::new(kind),
                }),
            ),
            _ => ResolverError::new(self.dtmi.clone(), kind),
        }
    }
}

/// Resolves `requested` (duplicates collapse onto their first occurrence)
/// against `fetcher`, reporting progress to `sink`.
pub async fn resolve_models(
    fetcher: &dyn ModelFetcher,
    sink: &dyn ResolverEventSink,
    mode: DependencyResolution,
    requested: &[String],
) -> Result<ResolvedModels, ResolverError> {
    Resolution {
        fetcher,
        sink,
        mode,
    }
    .run(requested)
    .await
}

struct Resolution<'a> {
    fetcher: &'a dyn ModelFetcher,
    sink: &'a dyn ResolverEventSink,
    mode: DependencyResolution,
}

impl Resolution<'_> {
    async fn run(&self, requested: &[String]) -> Result<ResolvedModels, ResolverError> {
        let mut roots: HashSet<&str> = HashSet::new();
        let mut queue = requested
            .iter()
            .filter(|dtmi| roots.insert(dtmi.as_str()))
            .map(|dtmi| WorkItem::root(dtmi))
            .collect::<VecDeque<_>>();
        let mut visited: HashSet<String> = HashSet::new();
        let mut resolved = ResolvedModels::new();

        while let Some(item) = queue.pop_front() {
            if visited.contains(&item.dtmi) {
                self.sink
                    .trace(&messages::skipping_pre_processed_dtmi(&item.dtmi));
                continue;
            }
            self.sink.trace(&messages::processing_dtmi(&item.dtmi));
            visited.insert(item.dtmi.clone());

            let dtmi = Dtmi::parse(&item.dtmi).map_err(|error| {
                item.fail(ResolverErrorKind::InvalidDtmiFormat { dtmi: error.0 })
            })?;

            if self.mode == DependencyResolution::FromExpanded {
                let bundle = self
                    .fetch_expanded(&dtmi)
                    .await
                    .map_err(|kind| item.fail(kind))?;
                if let Some(bundle) = bundle {
                    for model in bundle {
                        visited.insert(model.id.clone());
                        resolved.insert(model.id, model.content);
                    }
                    continue;
                }
            }

            let content = self
                .fetch_model(&dtmi)
                .await
                .map_err(|kind| item.fail(kind))?;

            if self.mode == DependencyResolution::Disabled {
                resolved.insert(item.dtmi.clone(), content);
                continue;
            }

            let dependencies =
                extract_dependencies(&content).map_err(|error| item.fail(error.into()))?;
            if !dependencies.is_empty() {
                self.sink
                    .trace(&messages::discovered_dependencies(dependencies.as_slice()));
            }
            resolved.insert(item.dtmi.clone(), content);
            for dependency in dependencies {
                if !visited.contains(dependency.as_str()) {
                    queue.push_back(WorkItem::dependency(dependency.into_string(), &item.dtmi));
                }
            }
        }

        Ok(resolved)
    }

    async fn fetch(&self, dtmi: &Dtmi, expanded: bool) -> (String, Result<String, FetchError>) {
        let relative_path = dtmi.to_relative_path(expanded);
        let location = self.fetcher.locate(&relative_path);
        self.sink.trace(&messages::fetching_content(&location));
        let result = self.fetcher.fetch(&relative_path).await;
        (location, result)
    }

    async fn fetch_model(&self, dtmi: &Dtmi) -> Result<String, ResolverErrorKind> {
        let content = match self.fetch(dtmi, false).await {
            (_, Ok(content)) => content,
            (_, Err(FetchError::NotFound { path })) => {
                return Err(ResolverErrorKind::ContentNotFound { path })
            }
            (_, Err(error)) => return Err(ResolverErrorKind::Fetch(error)),
        };
        match model_id(&content)? {
            Some(actual) => check_declared_id(dtmi, &actual)?,
            None => {
                return Err(ResolverErrorKind::InvalidContent {
                    reason: "model document does not declare \"@id\"".to_string(),
                })
            }
        }
        Ok(content)
    }

    /// `Ok(None)` means no bundle exists and the caller should fall back to
    /// the individual document.
    async fn fetch_expanded(
        &self,
        dtmi: &Dtmi,
    ) -> Result<Option<Vec<BundledModel>>, ResolverErrorKind> {
        let content = match self.fetch(dtmi, true).await {
            (_, Ok(content)) => content,
            (location, Err(FetchError::NotFound { .. })) => {
                self.sink.warning(&self.not_found_warning(&location));
                return Ok(None);
            }
            (_, Err(error)) => return Err(ResolverErrorKind::Fetch(error)),
        };

        let bundle = split_expanded(&content)?;
        let declared = bundle
            .iter()
            .map(|model| model.id.as_str())
            .find(|id| *id == dtmi.as_str())
            .or_else(|| {
                bundle
                    .iter()
                    .map(|model| model.id.as_str())
                    .find(|id| id.eq_ignore_ascii_case(dtmi.as_str()))
            });
        match declared {
            Some(actual) => check_declared_id(dtmi, actual)?,
            None => {
                return Err(ResolverErrorKind::InvalidContent {
                    reason: "expanded bundle does not contain the requested model".to_string(),
                })
            }
        }
        Ok(Some(bundle))
    }

    fn not_found_warning(&self, location: &str) -> String {
        match self.fetcher.kind() {
            FetcherKind::Local => messages::error_access_local_repository_model(location),
            FetcherKind::Remote => messages::error_access_remote_repository_model(location),
        }
    }
}

/// Repositories are authoritative for casing: the declared `@id` must equal
/// the requested identifier byte for byte.
fn check_declared_id(requested: &Dtmi, actual: &str) -> Result<(), ResolverErrorKind> {
    if actual == requested.as_str() {
        return Ok(());
    }
    if actual.eq_ignore_ascii_case(requested.as_str()) {
        return Err(ResolverErrorKind::IncorrectDtmiCasing {
            requested: requested.as_str().to_string(),
            actual: actual.to_string(),
        });
    }
    Err(ResolverErrorKind::InvalidContent {
        reason: format!(
            "declared identifier \"{actual}\" does not match \"{}\"",
            requested.as_str()
        ),
    })
}
