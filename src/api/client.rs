//! Reqwest client wrapper scoped to a specific backend.
//!
//! `ApiClient` pairs an HTTP client with the backend's base URL, matching the design
//! where API effects are backend-scoped (`ApiEffect` variants carry no host).

use reqwest::Url;

use crate::config::ClientConfig;

use super::error::ApiError;

/// A backend API client scoped to one base URL.
#[derive(Clone)]
pub struct ApiClient {
    /// The underlying reqwest client.
    http: reqwest::Client,

    /// The API root all endpoint paths are appended to.
    base_url: Url,
}

impl ApiClient {
    /// Creates a new client from an existing reqwest client and a base URL.
    pub fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Creates a client from configuration, applying the configured request timeout.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.api_base_url).map_err(|e| {
            ApiError::validation(format!(
                "invalid API base URL {:?}: {}",
                config.api_base_url, e
            ))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::validation(format!(
                "API base URL {:?} cannot carry a path",
                config.api_base_url
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ApiError::from_reqwest)?;
        Ok(Self::new(http, base_url))
    }

    /// Returns a reference to the underlying reqwest client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.http
    }

    /// Returns the base URL this client is scoped to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the URL for an endpoint from raw path segments.
    ///
    /// Each segment is percent-encoded, so user input such as a search query or slug
    /// cannot alter the path structure.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ApiError::validation(format!("API base URL {} cannot carry a path", self.base_url))
            })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}
