use async_trait::async_trait;
use reqwest::{header::USER_AGENT, StatusCode, Url};

use super::{FetchError, FetcherKind, ModelFetcher};
use crate::settings::RemoteFetcherConfig;

#[derive(Debug, Clone)]
/// Reads model documents from an HTTP(S) repository base URL.
pub struct RemoteFetcher {
    client: reqwest::Client,
    base: Url,
    user_agent: String,
}

impl RemoteFetcher {
    pub fn new(base: Url, config: &RemoteFetcherConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(
                config.request_timeout_ms.max(1),
            ))
            .build()
            .map_err(|source| FetchError::Transport {
                url: base.to_string(),
                source,
            })?;
        Ok(Self {
            client,
            base,
            user_agent: config.user_agent.clone(),
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }
}

#[async_trait]
impl ModelFetcher for RemoteFetcher {
    fn kind(&self) -> FetcherKind {
        FetcherKind::Remote
    }

    fn scheme(&self) -> &str {
        self.base.scheme()
    }

    fn locate(&self, relative_path: &str) -> String {
        format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            relative_path.trim_start_matches('/')
        )
    }

    async fn fetch(&self, relative_path: &str) -> Result<String, FetchError> {
        let url = self.locate(relative_path);
        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, self.user_agent.as_str())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound { path: url });
        }
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }
        response
            .text()
            .await
            .map_err(|source| FetchError::Transport { url, source })
    }
}
