//! Repository roots and selection of the matching fetch capability.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use reqwest::Url;

use crate::fetch::{FetchError, LocalFetcher, ModelFetcher, RemoteFetcher};
use crate::settings::RemoteFetcherConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Root of a model repository. A client works against exactly one root.
pub enum RepositoryLocation {
    /// Absolute directory, addressed through a `file://` URI.
    Local { path: PathBuf, uri: Url },
    /// HTTP(S) base URL.
    Remote { uri: Url },
}

impl RepositoryLocation {
    pub fn local(path: impl AsRef<Path>) -> Result<Self, FetchError> {
        let path = path.as_ref();
        let absolute = std::path::absolute(path).map_err(|error| FetchError::InvalidLocation {
            location: path.display().to_string(),
            reason: error.to_string(),
        })?;
        let absolute = normalize_lexically(&absolute);
        let uri = Url::from_directory_path(&absolute).map_err(|()| FetchError::InvalidLocation {
            location: absolute.display().to_string(),
            reason: "path cannot be expressed as a file URI".to_string(),
        })?;
        Ok(Self::Local {
            path: absolute,
            uri,
        })
    }

    pub fn remote(url: &str) -> Result<Self, FetchError> {
        let uri = Url::parse(url.trim()).map_err(|error| FetchError::InvalidLocation {
            location: url.to_string(),
            reason: error.to_string(),
        })?;
        match uri.scheme() {
            "http" | "https" => Ok(Self::Remote { uri }),
            other => Err(FetchError::InvalidLocation {
                location: url.to_string(),
                reason: format!("unsupported scheme '{other}'; expected http or https"),
            }),
        }
    }

    /// Detects the root kind from `value`: `http(s)://` is remote, `file://`
    /// and plain paths (including `C:\...` drive paths) are local. Any other
    /// URL scheme is rejected.
    pub fn parse(value: &str) -> Result<Self, FetchError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(FetchError::InvalidLocation {
                location: value.to_string(),
                reason: "repository location cannot be empty".to_string(),
            });
        }
        match Url::parse(trimmed) {
            Ok(uri) if matches!(uri.scheme(), "http" | "https") => Ok(Self::Remote { uri }),
            Ok(uri) if uri.scheme().len() > 1 && uri.scheme() != "file" => {
                Err(FetchError::InvalidLocation {
                    location: value.to_string(),
                    reason: format!(
                        "unsupported scheme '{}'; expected http or https",
                        uri.scheme()
                    ),
                })
            }
            Ok(uri) if uri.scheme() == "file" => {
                let path = uri
                    .to_file_path()
                    .map_err(|()| FetchError::InvalidLocation {
                        location: value.to_string(),
                        reason: "file URI does not name a local path".to_string(),
                    })?;
                Self::local(path)
            }
            _ => Self::local(trimmed),
        }
    }

    pub fn uri(&self) -> &Url {
        match self {
            RepositoryLocation::Local { uri, .. } | RepositoryLocation::Remote { uri } => uri,
        }
    }

    pub fn scheme(&self) -> &str {
        self.uri().scheme()
    }

    pub fn is_local(&self) -> bool {
        matches!(self, RepositoryLocation::Local { .. })
    }

    /// Builds the fetch capability for this root. Called once per client.
    pub fn fetcher(
        &self,
        remote: &RemoteFetcherConfig,
    ) -> Result<Arc<dyn ModelFetcher>, FetchError> {
        match self {
            RepositoryLocation::Local { path, .. } => Ok(Arc::new(LocalFetcher::new(path.clone()))),
            RepositoryLocation::Remote { uri } => {
                Ok(Arc::new(RemoteFetcher::new(uri.clone(), remote)?))
            }
        }
    }
}

/// Folds `.` and `..` components without touching the filesystem; the root
/// may not exist yet.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(component),
            },
            other => normalized.push(other),
        }
    }
    normalized
}

impl std::fmt::Display for RepositoryLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.uri().as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Component, Path, PathBuf};

    use super::{normalize_lexically, RepositoryLocation};
    use crate::fetch::{FetchError, LocalFetcher, ModelFetcher};

    #[test]
    fn unit_parse_detects_remote_and_local_roots() {
        let remote = RepositoryLocation::parse("https://devicemodels.azure.com").expect("remote");
        assert!(!remote.is_local());
        assert_eq!(remote.scheme(), "https");

        let local = RepositoryLocation::parse("relative/models").expect("local");
        assert!(local.is_local());
        assert_eq!(local.scheme(), "file");
        let RepositoryLocation::Local { path, uri } = &local else {
            panic!("expected local root");
        };
        assert!(path.is_absolute());
        assert!(uri.as_str().ends_with("relative/models/"));
    }

    #[test]
    fn unit_parse_accepts_file_uris() {
        let location = RepositoryLocation::parse("file:///srv/models").expect("file uri");
        assert!(location.is_local());
        assert!(location.uri().as_str().starts_with("file:///srv/models"));
    }

    #[test]
    fn unit_remote_rejects_non_http_schemes() {
        let error = RepositoryLocation::remote("ftp://models.example").expect_err("ftp");
        assert!(matches!(error, FetchError::InvalidLocation { .. }));
        assert!(RepositoryLocation::parse("   ").is_err());

        let error = RepositoryLocation::parse("ftp://models.example/repo")
            .expect_err("ftp is not a repository scheme");
        assert!(matches!(
            error,
            FetchError::InvalidLocation { ref reason, .. }
                if reason == "unsupported scheme 'ftp'; expected http or https"
        ));
    }

    #[test]
    fn unit_local_roots_fold_current_and_parent_components() {
        let location = RepositoryLocation::local("models/./nested/../repo").expect("local");
        let RepositoryLocation::Local { path, uri } = &location else {
            panic!("expected local root");
        };
        assert!(path.is_absolute());
        assert!(path.ends_with("models/repo"));
        assert!(path
            .components()
            .all(|component| !matches!(component, Component::CurDir | Component::ParentDir)));
        assert!(uri.as_str().ends_with("/models/repo/"));
        assert!(!uri.as_str().contains("/../"));

        let fetcher = LocalFetcher::new(path.clone());
        assert_eq!(
            fetcher.locate("dtmi/com/example/thermostat-1.json"),
            path.join("dtmi")
                .join("com")
                .join("example")
                .join("thermostat-1.json")
                .display()
                .to_string()
        );
    }

    #[test]
    fn unit_normalize_lexically_stops_at_filesystem_root() {
        assert_eq!(
            normalize_lexically(Path::new("/srv/../../models/./repo")),
            PathBuf::from("/models/repo")
        );
    }
}
