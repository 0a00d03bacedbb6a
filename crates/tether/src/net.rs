//! Thin wrapper around the HTTP client used for byte fetches.

use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum NetError {
    #[error("HTTP error {status} for {url}")]
    Http { url: Url, status: u16 },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type NetResult<T> = Result<T, NetError>;

/// A completed byte fetch. `final_url` reflects any redirects followed.
#[derive(Clone, Debug)]
pub struct FetchedBytes {
    pub bytes: Bytes,
    pub final_url: Url,
}

#[derive(Clone, Debug)]
pub struct NetClient {
    inner: reqwest::Client,
    request_timeout: Duration,
}

impl NetClient {
    /// # Panics
    ///
    /// Panics if the `reqwest::Client` builder fails to build.
    #[must_use]
    pub fn new(request_timeout: Duration) -> Self {
        let inner = reqwest::Client::builder()
            .build()
            .expect("failed to build reqwest client");
        Self {
            inner,
            request_timeout,
        }
    }

    /// Fetch a full response body.
    ///
    /// # Errors
    ///
    /// Returns [`NetError`] on HTTP failure, timeout, or network error.
    pub async fn get_bytes(&self, url: Url) -> NetResult<FetchedBytes> {
        let resp = self
            .inner
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await?;
        let status = resp.status();
        let final_url = resp.url().clone();

        if !status.is_success() {
            return Err(NetError::Http {
                url: final_url,
                status: status.as_u16(),
            });
        }

        let bytes = resp.bytes().await?;
        Ok(FetchedBytes { bytes, final_url })
    }
}
