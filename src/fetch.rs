//! The external fetch collaborator: the core only supplies URLs and consumes
//! downloaded bytes. Rate limiting, redirects, and retry-on-network-error
//! belong to the implementation behind this trait, not the collection driver.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::FetchError;
use crate::source::DownloadTarget;

/// Fetches the bytes for one download target.
///
/// On failure the collaborator returns a structured [`FetchError`] rather than
/// raising into the core; the driver records it and terminates that lineage
/// only.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, target: &DownloadTarget) -> Result<Vec<u8>, FetchError>;
}

/// Plain HTTP fetcher over a shared reqwest client.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, target: &DownloadTarget) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(&target.url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: target.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: target.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                url: target.url.clone(),
                source,
            })?;

        Ok(body.to_vec())
    }
}
