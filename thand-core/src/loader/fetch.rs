//! Trait seams for the HTTP and vault collaborators the Source Loader reads
//! through. Neither has a shipped implementation in the core by default —
//! HTTP routing and vault backends are out-of-scope external collaborators
//! (SPEC_FULL §1). A `reqwest`-backed `UrlFetcher` is provided behind the
//! `loader-http` feature purely for convenience, since `reqwest` is already
//! carried for the sync transport (`thand-sync`).

use crate::error::CoreError;
use std::future::Future;
use std::pin::Pin;

/// Fetches a definition document body from an HTTP endpoint.
pub trait UrlFetcher: Send + Sync {
    fn fetch_url<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, CoreError>> + Send + 'a>>;
}

/// Fetches a definition document body from a secret store by key.
pub trait SecretFetcher: Send + Sync {
    fn fetch_secret<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, CoreError>> + Send + 'a>>;
}

#[cfg(feature = "loader-http")]
pub struct ReqwestUrlFetcher {
    client: reqwest::Client,
    timeout: std::time::Duration,
}

#[cfg(feature = "loader-http")]
impl ReqwestUrlFetcher {
    /// `timeout` defaults to 5s per SPEC_FULL §5 ("HTTP loader requests use
    /// the environment's configured timeout (default 5 s)").
    pub fn new(timeout: std::time::Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[cfg(feature = "loader-http")]
impl Default for ReqwestUrlFetcher {
    fn default() -> Self {
        Self::new(std::time::Duration::from_secs(5))
    }
}

#[cfg(feature = "loader-http")]
impl UrlFetcher for ReqwestUrlFetcher {
    fn fetch_url<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, CoreError>> + Send + 'a>> {
        Box::pin(async move {
            let resp = self
                .client
                .get(url)
                .timeout(self.timeout)
                .send()
                .await
                .map_err(|e| CoreError::Load(e.to_string()))?;
            resp.text().await.map_err(|e| CoreError::Load(e.to_string()))
        })
    }
}
