//! HTTP access to the account dashboard
//!
//! The `Fetcher` trait is the seam between the orchestrator and the network so
//! the cache logic can be exercised without a live upstream.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, COOKIE, USER_AGENT};
use reqwest::Client;
use tracing::debug;

use crate::error::FetchError;

/// Base URL of the account dashboard
pub const DASHBOARD_BASE_URL: &str = "https://www.aicodemirror.com";

/// Timeout for read-only requests
const GET_TIMEOUT: Duration = Duration::from_secs(3);

/// Timeout for state-changing requests
const POST_TIMEOUT: Duration = Duration::from_secs(5);

/// Browser user agent; the dashboard rejects obvious non-browser clients
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Issues authenticated requests against the dashboard host
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GETs `path` and returns the body of a successful response
    async fn get(&self, path: &str, accept: &str, credential: &str) -> Result<String, FetchError>;

    /// POSTs to `path`, succeeding only on a success status
    async fn post(&self, path: &str, credential: &str) -> Result<(), FetchError>;
}

/// `Fetcher` backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: String,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Creates a fetcher for the production dashboard
    pub fn new() -> Self {
        Self::with_base_url(DASHBOARD_BASE_URL)
    }

    /// Creates a fetcher for a custom base URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, path: &str, accept: &str, credential: &str) -> Result<String, FetchError> {
        let url = self.url(path);
        debug!(%url, "fetching");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, accept)
            .header(COOKIE, credential)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .timeout(GET_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }

    async fn post(&self, path: &str, credential: &str) -> Result<(), FetchError> {
        let url = self.url(path);
        debug!(%url, "posting");

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .header(COOKIE, credential)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .timeout(POST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(())
    }
}
