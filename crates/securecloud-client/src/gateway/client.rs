//! Bare HTTP client bound to the REST base URL.

use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use tracing::debug;

use securecloud_core::error::{Error, TransportError};
use securecloud_core::types::ApiUrl;

/// HTTP client for REST requests.
///
/// Knows the base URL and the timeout, nothing about tokens.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base: ApiUrl,
}

impl HttpClient {
    /// Create a client for the given base URL.
    pub fn new(base: ApiUrl, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("securecloud/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Http {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, base })
    }

    /// Start a request to `path` under the base URL.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.base.endpoint(path);
        debug!(%method, %url, "Building request");
        self.client.request(method, url)
    }
}
