use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{FetchError, FetcherKind, ModelFetcher};

#[derive(Debug, Clone)]
/// Reads model documents from a directory tree.
pub struct LocalFetcher {
    root: PathBuf,
}

impl LocalFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, relative_path: &str) -> PathBuf {
        let mut path = self.root.clone();
        for segment in relative_path.split('/').filter(|segment| !segment.is_empty()) {
            path.push(segment);
        }
        path
    }
}

#[async_trait]
impl ModelFetcher for LocalFetcher {
    fn kind(&self) -> FetcherKind {
        FetcherKind::Local
    }

    fn scheme(&self) -> &str {
        "file"
    }

    fn locate(&self, relative_path: &str) -> String {
        self.path_for(relative_path).display().to_string()
    }

    async fn fetch(&self, relative_path: &str) -> Result<String, FetchError> {
        let path = self.path_for(relative_path);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                Err(FetchError::NotFound {
                    path: path.display().to_string(),
                })
            }
            Err(source) => Err(FetchError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}
